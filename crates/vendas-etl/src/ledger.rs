//! Processed-file ledger.
//!
//! A local SQLite table recording which source files have already been
//! fully processed, so reruns skip them. File identity is the base name
//! only; a recorded name is skipped forever, even if its content changes.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use vendas_common::Result;

/// One row of `historico_arquivos`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerEntry {
    pub nome_arquivo: String,
    pub horario_processamento: DateTime<Utc>,
}

/// Ledger over a local SQLite file, created on first open.
pub struct ProcessedFileLedger {
    pool: SqlitePool,
}

impl ProcessedFileLedger {
    /// Open (or create) the ledger database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Create the `historico_arquivos` table if it does not exist.
    /// Idempotent; must run before any other ledger call on a fresh store.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS historico_arquivos (
                nome_arquivo TEXT NOT NULL,
                horario_processamento TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Distinct names of every file recorded as processed.
    pub async fn processed_names(&self) -> Result<HashSet<String>> {
        let rows = sqlx::query("SELECT DISTINCT nome_arquivo FROM historico_arquivos")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("nome_arquivo")).collect())
    }

    /// Record `file_name` as processed at the current instant.
    ///
    /// No uniqueness constraint: recording the same name twice leaves two
    /// rows, which `processed_names` collapses.
    pub async fn record(&self, file_name: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO historico_arquivos (nome_arquivo, horario_processamento) VALUES (?1, ?2)",
        )
        .bind(file_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All ledger rows, oldest first.
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT nome_arquivo, horario_processamento
            FROM historico_arquivos
            ORDER BY horario_processamento
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
