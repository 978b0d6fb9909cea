//! In-memory columnar table shared by the readers, the transform and the sink.

use std::collections::HashSet;

use vendas_common::{PipelineError, Result};

/// Typed cell storage for one column. `None` models a null or missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(values) => values.len(),
            ColumnData::Float(values) => values.len(),
            ColumnData::Bool(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Int(_) => "int",
            ColumnData::Float(_) => "float",
            ColumnData::Bool(_) => "bool",
            ColumnData::Text(_) => "text",
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Numeric view of this column, or `None` for bool/text columns.
    pub fn as_numeric(&self) -> Option<NumericColumn<'_>> {
        match &self.data {
            ColumnData::Int(values) => Some(NumericColumn::Int(values)),
            ColumnData::Float(values) => Some(NumericColumn::Float(values)),
            ColumnData::Bool(_) | ColumnData::Text(_) => None,
        }
    }
}

/// Borrowed numeric view over a column, used by the transform.
#[derive(Debug, Clone, Copy)]
pub enum NumericColumn<'a> {
    Int(&'a [Option<i64>]),
    Float(&'a [Option<f64>]),
}

impl NumericColumn<'_> {
    /// Value at `idx` widened to f64; `None` when null or out of range.
    pub fn value_as_f64(&self, idx: usize) -> Option<f64> {
        match self {
            NumericColumn::Int(values) => values.get(idx).copied().flatten().map(|v| v as f64),
            NumericColumn::Float(values) => values.get(idx).copied().flatten(),
        }
    }
}

/// An ordered collection of equal-length columns.
///
/// The two structural invariants (equal column lengths, unique column
/// names) are enforced at construction, so downstream code can index
/// rows without re-checking.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset, rejecting ragged columns and duplicate names.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(|c| c.data.len()).unwrap_or(0);

        let mut seen = HashSet::new();
        for column in &columns {
            if column.data.len() != row_count {
                return Err(PipelineError::schema(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.data.len(),
                    row_count
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(PipelineError::schema(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Copy of this dataset with `column` appended on the right.
    pub fn with_column(&self, column: Column) -> Result<Self> {
        if self.column(&column.name).is_some() {
            return Err(PipelineError::schema(format!(
                "duplicate column '{}'",
                column.name
            )));
        }
        if !self.columns.is_empty() && column.data.len() != self.row_count {
            return Err(PipelineError::schema(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.data.len(),
                self.row_count
            )));
        }

        let row_count = if self.columns.is_empty() {
            column.data.len()
        } else {
            self.row_count
        };
        let mut columns = self.columns.clone();
        columns.push(column);
        Ok(Self { columns, row_count })
    }
}
