//! Error types shared across the pipeline crates.

use thiserror::Error;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// All failure modes of a pipeline run.
///
/// Any error raised while handling a file aborts the whole run; there is
/// no per-file isolation. The ledger is only written after a successful
/// save, so an aborted run leaves the failing file unrecorded and it will
/// be retried on the next invocation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Folder sync failed: {0}")]
    Sync(String),

    #[error("Unsupported file type '{0}': expected csv, json or parquet")]
    UnsupportedType(String),

    #[error("Failed to parse '{file}': {message}")]
    Parse { file: String, message: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Destination table '{table}' rejected the write: {message}")]
    SchemaMismatch { table: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Create a sync error with a custom message.
    pub fn sync<S: Into<String>>(msg: S) -> Self {
        PipelineError::Sync(msg.into())
    }

    /// Create an unsupported-type error for the given extension.
    pub fn unsupported<S: Into<String>>(ext: S) -> Self {
        PipelineError::UnsupportedType(ext.into())
    }

    /// Create a parse error tied to a source file.
    pub fn parse<F: Into<String>, M: Into<String>>(file: F, message: M) -> Self {
        PipelineError::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a schema error with a custom message.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        PipelineError::Schema(msg.into())
    }

    /// Create a schema-mismatch error for the given destination table.
    pub fn schema_mismatch<T: Into<String>, M: Into<String>>(table: T, message: M) -> Self {
        PipelineError::SchemaMismatch {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error with a custom message.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PipelineError::Config(msg.into())
    }
}
