//! File-format readers.
//!
//! One [`DatasetReader`] implementation per supported [`FileType`]; the
//! pipeline resolves the right one through [`FileType::reader`] and never
//! matches on the format itself.

mod csv;
mod json;
mod parquet;

pub use csv::CsvReader;
pub use json::JsonReader;
pub use parquet::ParquetReader;

use std::path::Path;

use vendas_common::Result;

use crate::dataset::Dataset;
use crate::source::FileType;

/// Parses one on-disk file into a [`Dataset`].
pub trait DatasetReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Dataset>;
}

impl FileType {
    /// The reader able to parse files of this type.
    pub fn reader(&self) -> &'static dyn DatasetReader {
        match self {
            FileType::Csv => &CsvReader,
            FileType::Json => &JsonReader,
            FileType::Parquet => &ParquetReader,
        }
    }
}

/// Base name used in parse-error messages.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
