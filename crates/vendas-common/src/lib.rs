//! Vendas Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the vendas pipeline workspace.
//!
//! # Example
//!
//! ```no_run
//! use vendas_common::{PipelineError, Result};
//!
//! fn classify(ext: &str) -> Result<()> {
//!     match ext {
//!         "csv" | "json" | "parquet" => Ok(()),
//!         other => Err(PipelineError::unsupported(other)),
//!     }
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{PipelineError, Result};
