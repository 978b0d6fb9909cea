//! Derived-column computation.

use tracing::debug;
use vendas_common::{PipelineError, Result};

use crate::dataset::{Column, ColumnData, Dataset, NumericColumn};

/// Name of the derived column appended by [`transform`].
pub const TOTAL_COLUMN: &str = "total_vendas";

const QUANTITY_COLUMN: &str = "quantidade";
const VALUE_COLUMN: &str = "valor";

/// Return a copy of `dataset` with `total_vendas = quantidade * valor`
/// appended.
///
/// Int times Int stays Int; any Float operand widens the product to
/// Float. A null in either operand yields a null product. A missing or
/// non-numeric operand column is a schema error and the input is left
/// untouched, as is an Int product outside the i64 range.
pub fn transform(dataset: &Dataset) -> Result<Dataset> {
    let quantidade = numeric_column(dataset, QUANTITY_COLUMN)?;
    let valor = numeric_column(dataset, VALUE_COLUMN)?;

    let data = match (quantidade, valor) {
        (NumericColumn::Int(q), NumericColumn::Int(v)) => {
            let mut totals = Vec::with_capacity(q.len());
            for (a, b) in q.iter().zip(v) {
                totals.push(match (a, b) {
                    (Some(a), Some(b)) => Some(a.checked_mul(*b).ok_or_else(|| {
                        PipelineError::schema(format!(
                            "{} overflows: {} * {}",
                            TOTAL_COLUMN, a, b
                        ))
                    })?),
                    _ => None,
                });
            }
            ColumnData::Int(totals)
        },
        (quantidade, valor) => ColumnData::Float(
            (0..dataset.row_count())
                .map(
                    |idx| match (quantidade.value_as_f64(idx), valor.value_as_f64(idx)) {
                        (Some(a), Some(b)) => Some(a * b),
                        _ => None,
                    },
                )
                .collect(),
        ),
    };

    debug!(rows = dataset.row_count(), "computed {}", TOTAL_COLUMN);
    dataset.with_column(Column::new(TOTAL_COLUMN, data))
}

fn numeric_column<'a>(dataset: &'a Dataset, name: &str) -> Result<NumericColumn<'a>> {
    let column = dataset
        .column(name)
        .ok_or_else(|| PipelineError::schema(format!("required column '{}' is missing", name)))?;
    column.as_numeric().ok_or_else(|| {
        PipelineError::schema(format!(
            "column '{}' must be numeric, found {}",
            name,
            column.data.type_name()
        ))
    })
}
