//! Directory scanning and file classification for the local mirror.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;
use vendas_common::{PipelineError, Result};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Csv,
    Json,
    Parquet,
}

impl FileType {
    /// Resolve the type from a path's extension.
    ///
    /// Matching is case-sensitive: `vendas.CSV` is not recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("csv") => Some(FileType::Csv),
            Some("json") => Some(FileType::Json),
            Some("parquet") => Some(FileType::Parquet),
            _ => None,
        }
    }
}

impl FromStr for FileType {
    type Err = PipelineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "csv" => Ok(FileType::Csv),
            "json" => Ok(FileType::Json),
            "parquet" => Ok(FileType::Parquet),
            other => Err(PipelineError::unsupported(other)),
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileType::Csv => write!(f, "csv"),
            FileType::Json => write!(f, "json"),
            FileType::Parquet => write!(f, "parquet"),
        }
    }
}

/// One classified file of the local mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_type: FileType,
}

impl SourceFile {
    /// Base name of the file, the identity used by the processed-file ledger.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Scan `dir` and classify every supported file in it.
///
/// Subdirectories and files with unrecognized extensions are skipped
/// silently; a missing or unreadable directory propagates as an I/O
/// error. Results are sorted by name so runs are deterministic.
pub fn scan_directory(dir: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match FileType::from_path(&path) {
            Some(file_type) => files.push(SourceFile { path, file_type }),
            None => debug!(path = %path.display(), "skipping unsupported file"),
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
