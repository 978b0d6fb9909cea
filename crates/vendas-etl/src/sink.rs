//! Persistence sink for transformed datasets.
//!
//! Connects to whatever relational store `DATABASE_URL` names (Postgres
//! in production, SQLite in tests; the driver is picked by URL scheme)
//! and appends datasets to a destination table. Append-only: the sink
//! creates the table when absent and never drops, truncates or updates.

use std::sync::Once;

use sqlx::AnyPool;
use tracing::debug;
use vendas_common::{PipelineError, Result};

use crate::dataset::{ColumnData, Dataset};

static INSTALL_DRIVERS: Once = Once::new();

/// Destination store handle, URL-agnostic via sqlx `Any`.
pub struct DatabaseSink {
    pool: AnyPool,
}

impl DatabaseSink {
    /// Connect to the store at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
        let pool = AnyPool::connect(url).await?;
        Ok(Self { pool })
    }

    /// Append every row of `dataset` to `table`, creating the table from
    /// the dataset's schema if it does not exist.
    ///
    /// Rows are inserted one by one without a surrounding transaction, so
    /// a mid-append failure leaves the earlier rows in place. Writes the
    /// store rejects (unknown column, type clash) surface as
    /// [`PipelineError::SchemaMismatch`].
    pub async fn append(&self, dataset: &Dataset, table: &str) -> Result<()> {
        if dataset.column_count() == 0 {
            debug!(table, "nothing to append");
            return Ok(());
        }

        sqlx::query(&create_table_sql(table, dataset))
            .execute(&self.pool)
            .await?;

        let insert_sql = insert_sql(table, dataset);
        for row_idx in 0..dataset.row_count() {
            let mut query = sqlx::query(&insert_sql);
            for column in dataset.columns() {
                query = match &column.data {
                    ColumnData::Int(values) => query.bind(values[row_idx]),
                    ColumnData::Float(values) => query.bind(values[row_idx]),
                    ColumnData::Bool(values) => query.bind(values[row_idx]),
                    ColumnData::Text(values) => query.bind(values[row_idx].clone()),
                };
            }
            query
                .execute(&self.pool)
                .await
                .map_err(|e| write_error(table, e))?;
        }

        debug!(table, rows = dataset.row_count(), "appended rows");
        Ok(())
    }
}

fn create_table_sql(table: &str, dataset: &Dataset) -> String {
    let columns = dataset
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), sql_type(&c.data)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(table),
        columns
    )
}

fn insert_sql(table: &str, dataset: &Dataset) -> String {
    let column_names = dataset
        .columns()
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    // $N placeholders are understood by both Postgres and SQLite.
    let placeholders = (1..=dataset.column_count())
        .map(|n| format!("${}", n))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        column_names,
        placeholders
    )
}

fn sql_type(data: &ColumnData) -> &'static str {
    match data {
        ColumnData::Int(_) => "BIGINT",
        ColumnData::Float(_) => "DOUBLE PRECISION",
        ColumnData::Bool(_) => "BOOLEAN",
        ColumnData::Text(_) => "TEXT",
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Rejections reported by the store itself become schema mismatches;
/// connection-level failures stay database errors.
fn write_error(table: &str, err: sqlx::Error) -> PipelineError {
    match err {
        sqlx::Error::Database(db_err) => PipelineError::schema_mismatch(table, db_err.to_string()),
        other => PipelineError::Database(other),
    }
}
