//! Vendas ETL - batch sales pipeline

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use vendas_common::logging::{init_logging, LogConfig, LogLevel};
use vendas_etl::config::PipelineConfig;
use vendas_etl::ledger::ProcessedFileLedger;
use vendas_etl::pipeline::Pipeline;
use vendas_etl::sink::DatabaseSink;
use vendas_etl::sync::HttpFolderSync;

#[derive(Parser, Debug)]
#[command(name = "vendas-etl")]
#[command(author, version, about = "Batch sales ETL pipeline")]
struct Cli {
    /// Local mirror directory for the remote folder
    #[arg(long)]
    local_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Binary defaults for logging; explicit environment settings win.
fn logging_overrides(mut config: LogConfig, verbose: bool) -> LogConfig {
    if std::env::var("LOG_FILE_PREFIX").is_err() {
        config.log_file_prefix = "vendas-etl".to_string();
    }
    if verbose && std::env::var("LOG_LEVEL").is_err() {
        config.level = LogLevel::Debug;
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_config = logging_overrides(LogConfig::from_env()?, cli.verbose);
    init_logging(&log_config)?;

    let mut config = PipelineConfig::from_env()?;
    if let Some(local_dir) = cli.local_dir {
        config.local_dir = local_dir;
    }

    let sync = HttpFolderSync::new(&config.folder_url)?;
    let ledger = ProcessedFileLedger::open(&config.ledger_path).await?;
    let sink = DatabaseSink::connect(&config.database_url).await?;

    let log = Pipeline::new(&config, &sync, &ledger, &sink).run().await?;
    for line in log.lines() {
        println!("{}", line);
    }

    info!("pipeline run finished");
    Ok(())
}
