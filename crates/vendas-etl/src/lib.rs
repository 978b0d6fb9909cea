//! Vendas ETL Library
//!
//! A small batch pipeline over a remote folder of sales files
//! (CSV/JSON/Parquet): mirror the folder locally, compute
//! `total_vendas = quantidade * valor` for each file and append the
//! result to a relational destination table, recording every processed
//! file in a local ledger so reruns skip it.
//!
//! # Example
//!
//! ```no_run
//! use vendas_etl::config::PipelineConfig;
//! use vendas_etl::ledger::ProcessedFileLedger;
//! use vendas_etl::pipeline::Pipeline;
//! use vendas_etl::sink::DatabaseSink;
//! use vendas_etl::sync::HttpFolderSync;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::from_env()?;
//!     let sync = HttpFolderSync::new(&config.folder_url)?;
//!     let ledger = ProcessedFileLedger::open(&config.ledger_path).await?;
//!     let sink = DatabaseSink::connect(&config.database_url).await?;
//!
//!     let log = Pipeline::new(&config, &sync, &ledger, &sink).run().await?;
//!     for line in log.lines() {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod ledger;
pub mod pipeline;
pub mod reader;
pub mod sink;
pub mod source;
pub mod sync;
pub mod transform;
