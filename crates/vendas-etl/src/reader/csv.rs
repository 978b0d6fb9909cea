//! CSV reader with per-column type inference.

use std::path::Path;

use csv::ReaderBuilder;
use vendas_common::{PipelineError, Result};

use super::{display_name, DatasetReader};
use crate::dataset::{Column, ColumnData, Dataset};

/// Reads headered CSV files.
///
/// Each column gets the narrowest type that fits every non-empty cell:
/// Int, then Float, then Bool, falling back to Text. Empty cells become
/// nulls.
pub struct CsvReader;

impl DatasetReader for CsvReader {
    fn read(&self, path: &Path) -> Result<Dataset> {
        let file_name = display_name(path);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| PipelineError::parse(&file_name, e.to_string()))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| PipelineError::parse(&file_name, e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            // Ragged rows surface here as UnequalLengths with a line number.
            let record = record.map_err(|e| PipelineError::parse(&file_name, e.to_string()))?;
            for (idx, field) in record.iter().enumerate() {
                cells[idx].push(field.to_string());
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column::new(name, infer_column(&values)))
            .collect();

        Dataset::from_columns(columns)
    }
}

/// Narrowest type fitting every non-empty cell of one column.
fn infer_column(values: &[String]) -> ColumnData {
    if let Some(ints) = parse_all::<i64>(values) {
        return ColumnData::Int(ints);
    }
    if let Some(floats) = parse_all::<f64>(values) {
        return ColumnData::Float(floats);
    }
    if let Some(bools) = parse_all::<bool>(values) {
        return ColumnData::Bool(bools);
    }
    ColumnData::Text(
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.clone()))
            .collect(),
    )
}

/// Parse every non-empty cell as `T`, or `None` if any cell refuses.
/// An all-empty column refuses too, so it falls through to Text nulls.
fn parse_all<T: std::str::FromStr>(values: &[String]) -> Option<Vec<Option<T>>> {
    let mut out = Vec::with_capacity(values.len());
    let mut any_value = false;
    for value in values {
        if value.is_empty() {
            out.push(None);
        } else {
            match value.parse::<T>() {
                Ok(parsed) => {
                    any_value = true;
                    out.push(Some(parsed));
                },
                Err(_) => return None,
            }
        }
    }
    any_value.then_some(out)
}
