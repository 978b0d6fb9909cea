//! JSON reader for records-oriented documents.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use vendas_common::{PipelineError, Result};

use super::{display_name, DatasetReader};
use crate::dataset::{Column, ColumnData, Dataset};

/// Reads a top-level array of flat objects.
///
/// The column set is the union of keys over all records; keys absent
/// from a record read as null. Int and Float values unify to Float;
/// any other scalar mix renders to Text. Nested objects or arrays are
/// rejected.
pub struct JsonReader;

impl DatasetReader for JsonReader {
    fn read(&self, path: &Path) -> Result<Dataset> {
        let file_name = display_name(path);
        let text = std::fs::read_to_string(path)?;

        let root: Value = serde_json::from_str(&text)
            .map_err(|e| PipelineError::parse(&file_name, e.to_string()))?;
        let records = root.as_array().ok_or_else(|| {
            PipelineError::parse(&file_name, "expected a top-level array of objects")
        })?;

        let mut key_order: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for (idx, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                PipelineError::parse(&file_name, format!("record {} is not an object", idx))
            })?;
            for key in object.keys() {
                if seen.insert(key.clone()) {
                    key_order.push(key.clone());
                }
            }
        }

        let null = Value::Null;
        let mut columns = Vec::with_capacity(key_order.len());
        for key in &key_order {
            let values: Vec<&Value> = records
                .iter()
                .map(|r| r.as_object().and_then(|o| o.get(key)).unwrap_or(&null))
                .collect();
            columns.push(column_from_values(key, &values, &file_name)?);
        }

        Dataset::from_columns(columns)
    }
}

fn column_from_values(name: &str, values: &[&Value], file_name: &str) -> Result<Column> {
    let mut has_int = false;
    let mut has_float = false;
    let mut has_bool = false;
    let mut has_text = false;

    for value in values {
        match value {
            Value::Null => {},
            Value::Number(n) if n.is_i64() => has_int = true,
            Value::Number(_) => has_float = true,
            Value::Bool(_) => has_bool = true,
            Value::String(_) => has_text = true,
            Value::Array(_) | Value::Object(_) => {
                return Err(PipelineError::parse(
                    file_name,
                    format!("column '{}' contains nested values", name),
                ));
            },
        }
    }

    let data = if has_text || (has_bool && (has_int || has_float)) {
        ColumnData::Text(values.iter().map(|v| render_scalar(v)).collect())
    } else if has_float {
        ColumnData::Float(values.iter().map(|v| v.as_f64()).collect())
    } else if has_int {
        ColumnData::Int(values.iter().map(|v| v.as_i64()).collect())
    } else if has_bool {
        ColumnData::Bool(values.iter().map(|v| v.as_bool()).collect())
    } else {
        // Only nulls seen for this key.
        ColumnData::Text(vec![None; values.len()])
    };

    Ok(Column::new(name, data))
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
