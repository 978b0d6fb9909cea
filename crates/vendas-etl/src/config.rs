//! Pipeline configuration.
//!
//! Built once at startup and passed by reference; nothing reads the
//! environment after this point.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use vendas_common::{PipelineError, Result};

// ============================================================================
// Pipeline Configuration Constants
// ============================================================================

/// Local directory the remote folder is mirrored into.
pub const DEFAULT_LOCAL_DIR: &str = "./data/vendas";

/// SQLite file holding the processed-file ledger.
pub const DEFAULT_LEDGER_PATH: &str = "./historico.db";

/// Destination table for transformed rows.
pub const DEFAULT_DESTINATION_TABLE: &str = "vendas_calculado";

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Remote folder locator (`URL_PASTA`)
    pub folder_url: String,

    /// Destination store URL (`DATABASE_URL`)
    pub database_url: String,

    /// Local mirror directory
    pub local_dir: PathBuf,

    /// Processed-file ledger location
    pub ledger_path: PathBuf,

    /// Destination table name
    pub destination_table: String,
}

impl PipelineConfig {
    /// Create a config with the default paths and table name.
    pub fn new(folder_url: impl Into<String>, database_url: impl Into<String>) -> Self {
        Self {
            folder_url: folder_url.into(),
            database_url: database_url.into(),
            local_dir: PathBuf::from(DEFAULT_LOCAL_DIR),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            destination_table: DEFAULT_DESTINATION_TABLE.to_string(),
        }
    }

    /// Load configuration from the environment.
    ///
    /// `URL_PASTA` and `DATABASE_URL` are required; a missing (or empty)
    /// one fails fast with a [`PipelineError::Config`] naming it.
    pub fn from_env() -> Result<Self> {
        let folder_url = require_var("URL_PASTA")?;
        let database_url = require_var("DATABASE_URL")?;
        Ok(Self::new(folder_url, database_url))
    }
}

fn require_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PipelineError::config(format!(
            "environment variable {} is not set",
            name
        ))),
    }
}
