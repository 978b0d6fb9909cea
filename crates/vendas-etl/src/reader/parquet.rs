//! Parquet reader built on the row API.

use std::fs::File;
use std::path::Path;

use parquet::basic::{ConvertedType, LogicalType, Repetition, Type as PhysicalType};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use parquet::schema::types::Type as SchemaType;
use vendas_common::{PipelineError, Result};

use super::{display_name, DatasetReader};
use crate::dataset::{Column, ColumnData, Dataset};

/// Reads flat Parquet files.
///
/// Integer columns map to Int, float/double to Float, booleans to Bool
/// and everything else scalar (strings, dates, timestamps, decimals) to
/// Text via its display form. Nested schemas are rejected.
pub struct ParquetReader;

impl DatasetReader for ParquetReader {
    fn read(&self, path: &Path) -> Result<Dataset> {
        let file_name = display_name(path);
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)
            .map_err(|e| PipelineError::parse(&file_name, e.to_string()))?;

        let schema: Vec<(String, ColumnKind)> = reader
            .metadata()
            .file_metadata()
            .schema()
            .get_fields()
            .iter()
            .map(|field| {
                if field.is_group()
                    || field.get_basic_info().repetition() == Repetition::REPEATED
                {
                    Err(PipelineError::parse(
                        &file_name,
                        format!("column '{}' has a nested type", field.name()),
                    ))
                } else {
                    Ok((field.name().to_string(), column_kind(field)))
                }
            })
            .collect::<Result<_>>()?;

        let mut cells: Vec<Vec<Field>> = vec![Vec::new(); schema.len()];
        let rows = reader
            .get_row_iter(None)
            .map_err(|e| PipelineError::parse(&file_name, e.to_string()))?;
        for row in rows {
            let row = row.map_err(|e| PipelineError::parse(&file_name, e.to_string()))?;
            for (idx, (_, field)) in row.get_column_iter().enumerate() {
                match cells.get_mut(idx) {
                    Some(column) => column.push(field.clone()),
                    None => {
                        return Err(PipelineError::parse(&file_name, "row wider than schema"));
                    },
                }
            }
        }

        let columns = schema
            .into_iter()
            .zip(cells)
            .map(|((name, kind), fields)| column_from_fields(name, kind, fields, &file_name))
            .collect::<Result<Vec<_>>>()?;

        Dataset::from_columns(columns)
    }
}

/// Storage class a schema field maps to.
#[derive(Debug, Clone, Copy)]
enum ColumnKind {
    Bool,
    Int,
    Float,
    Text,
}

/// Classify a primitive field by its declared types, so all-null and
/// zero-row columns stay typed instead of collapsing to Text. Annotated
/// ints (dates, times, timestamps, decimals) count as Text, matching
/// their row-API display form.
fn column_kind(field: &SchemaType) -> ColumnKind {
    let info = field.get_basic_info();
    let plain_int = matches!(
        info.converted_type(),
        ConvertedType::NONE
            | ConvertedType::INT_8
            | ConvertedType::INT_16
            | ConvertedType::INT_32
            | ConvertedType::INT_64
            | ConvertedType::UINT_8
            | ConvertedType::UINT_16
            | ConvertedType::UINT_32
            | ConvertedType::UINT_64
    ) && matches!(
        info.logical_type(),
        None | Some(LogicalType::Integer { .. })
    );

    match field.get_physical_type() {
        PhysicalType::BOOLEAN => ColumnKind::Bool,
        PhysicalType::INT32 | PhysicalType::INT64 if plain_int => ColumnKind::Int,
        PhysicalType::FLOAT | PhysicalType::DOUBLE => ColumnKind::Float,
        _ => ColumnKind::Text,
    }
}

fn column_from_fields(
    name: String,
    kind: ColumnKind,
    fields: Vec<Field>,
    file_name: &str,
) -> Result<Column> {
    let data = match kind {
        ColumnKind::Bool => ColumnData::Bool(
            fields
                .iter()
                .map(|f| match f {
                    Field::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect(),
        ),
        ColumnKind::Int => {
            let mut values = Vec::with_capacity(fields.len());
            for field in &fields {
                values.push(field_to_i64(field, &name, file_name)?);
            }
            ColumnData::Int(values)
        },
        ColumnKind::Float => ColumnData::Float(
            fields
                .iter()
                .map(|f| match f {
                    Field::Float(v) => Some(f64::from(*v)),
                    Field::Double(v) => Some(*v),
                    _ => None,
                })
                .collect(),
        ),
        ColumnKind::Text => ColumnData::Text(
            fields
                .iter()
                .map(|f| match f {
                    Field::Null => None,
                    Field::Str(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
    };

    Ok(Column::new(name, data))
}

fn field_to_i64(field: &Field, column: &str, file_name: &str) -> Result<Option<i64>> {
    let value = match field {
        Field::Null => None,
        Field::Byte(v) => Some(i64::from(*v)),
        Field::Short(v) => Some(i64::from(*v)),
        Field::Int(v) => Some(i64::from(*v)),
        Field::Long(v) => Some(*v),
        Field::UByte(v) => Some(i64::from(*v)),
        Field::UShort(v) => Some(i64::from(*v)),
        Field::UInt(v) => Some(i64::from(*v)),
        Field::ULong(v) => Some(i64::try_from(*v).map_err(|_| {
            PipelineError::parse(
                file_name,
                format!("column '{}': unsigned value out of i64 range", column),
            )
        })?),
        _ => None,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use parquet::data_type::{ByteArray, ByteArrayType, DoubleType, Int32Type, Int64Type};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;
    use tempfile::TempDir;

    /// Two rows of sales data; `produto` is null in the second row.
    fn write_fixture(path: &Path) {
        let schema = Arc::new(
            parse_message_type(
                "message vendas {
                    optional int64 quantidade;
                    optional double valor;
                    optional binary produto (UTF8);
                }",
            )
            .unwrap(),
        );
        let props = Arc::new(WriterProperties::builder().build());
        let file = fs::File::create(path).unwrap();
        let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
        let mut row_group = writer.next_row_group().unwrap();

        let mut quantidade = row_group.next_column().unwrap().unwrap();
        quantidade
            .typed::<Int64Type>()
            .write_batch(&[3, 5], Some(&[1, 1]), None)
            .unwrap();
        quantidade.close().unwrap();

        let mut valor = row_group.next_column().unwrap().unwrap();
        valor
            .typed::<DoubleType>()
            .write_batch(&[2.5, 1.0], Some(&[1, 1]), None)
            .unwrap();
        valor.close().unwrap();

        let mut produto = row_group.next_column().unwrap().unwrap();
        produto
            .typed::<ByteArrayType>()
            .write_batch(&[ByteArray::from("caneta")], Some(&[1, 0]), None)
            .unwrap();
        produto.close().unwrap();

        row_group.close().unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_reads_typed_columns_and_nulls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vendas.parquet");
        write_fixture(&path);

        let dataset = ParquetReader.read(&path).unwrap();

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(
            dataset.column("quantidade").unwrap().data,
            ColumnData::Int(vec![Some(3), Some(5)])
        );
        assert_eq!(
            dataset.column("valor").unwrap().data,
            ColumnData::Float(vec![Some(2.5), Some(1.0)])
        );
        assert_eq!(
            dataset.column("produto").unwrap().data,
            ColumnData::Text(vec![Some("caneta".into()), None])
        );
    }

    #[test]
    fn test_all_null_column_keeps_declared_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vendas.parquet");

        let schema = Arc::new(
            parse_message_type(
                "message vendas {
                    optional int64 quantidade;
                    optional double valor;
                }",
            )
            .unwrap(),
        );
        let props = Arc::new(WriterProperties::builder().build());
        let file = fs::File::create(&path).unwrap();
        let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
        let mut row_group = writer.next_row_group().unwrap();

        let mut quantidade = row_group.next_column().unwrap().unwrap();
        quantidade
            .typed::<Int64Type>()
            .write_batch(&[], Some(&[0, 0]), None)
            .unwrap();
        quantidade.close().unwrap();

        let mut valor = row_group.next_column().unwrap().unwrap();
        valor
            .typed::<DoubleType>()
            .write_batch(&[2.5, 1.0], Some(&[1, 1]), None)
            .unwrap();
        valor.close().unwrap();

        row_group.close().unwrap();
        writer.close().unwrap();

        let dataset = ParquetReader.read(&path).unwrap();

        assert_eq!(
            dataset.column("quantidade").unwrap().data,
            ColumnData::Int(vec![None, None])
        );
        assert_eq!(
            dataset.column("valor").unwrap().data,
            ColumnData::Float(vec![Some(2.5), Some(1.0)])
        );
    }

    #[test]
    fn test_date_column_reads_as_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vendas.parquet");

        let schema = Arc::new(
            parse_message_type(
                "message vendas {
                    optional int32 dia (DATE);
                }",
            )
            .unwrap(),
        );
        let props = Arc::new(WriterProperties::builder().build());
        let file = fs::File::create(&path).unwrap();
        let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
        let mut row_group = writer.next_row_group().unwrap();

        let mut dia = row_group.next_column().unwrap().unwrap();
        dia.typed::<Int32Type>()
            .write_batch(&[19000], Some(&[1]), None)
            .unwrap();
        dia.close().unwrap();

        row_group.close().unwrap();
        writer.close().unwrap();

        let dataset = ParquetReader.read(&path).unwrap();

        let data = &dataset.column("dia").unwrap().data;
        assert!(matches!(data, ColumnData::Text(values) if values[0].is_some()));
    }

    #[test]
    fn test_corrupt_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vendas.parquet");
        fs::write(&path, b"PAR1 but not really").unwrap();

        let result = ParquetReader.read(&path);
        assert!(matches!(result, Err(PipelineError::Parse { .. })));
    }
}
