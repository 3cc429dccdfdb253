use arrow::array::*;
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{CellValue, Table};
use crate::readers::ensure_exists;
use crate::utils::constants::DEFAULT_READ_BATCH_SIZE;

/// Loads a Parquet file into a [`Table`].
///
/// Columns listed as text columns are decoded to UTF-8 and trimmed whether
/// they are stored as strings or raw bytes.
pub struct ParquetTableReader {
    text_columns: Vec<String>,
}

impl ParquetTableReader {
    pub fn new() -> Self {
        Self {
            text_columns: Vec::new(),
        }
    }

    pub fn with_text_columns(mut self, columns: &[String]) -> Self {
        self.text_columns = columns.to_vec();
        self
    }

    pub fn read_table(&self, path: &Path, name: &str) -> Result<Table> {
        self.read_table_with_limit(path, name, 0)
    }

    /// Read at most `limit` rows (0 = all rows).
    pub fn read_table_with_limit(&self, path: &Path, name: &str, limit: usize) -> Result<Table> {
        ensure_exists(path)?;

        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let columns: Vec<String> = builder
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect();
        let reader = builder.with_batch_size(DEFAULT_READ_BATCH_SIZE).build()?;

        let mut table = Table::new(name, columns.clone());

        for batch_result in reader {
            let batch = batch_result?;
            let remaining = if limit == 0 {
                batch.num_rows()
            } else {
                (limit - table.len()).min(batch.num_rows())
            };

            let mut rows: Vec<Vec<CellValue>> = (0..remaining)
                .map(|_| Vec::with_capacity(columns.len()))
                .collect();

            for (array, column) in batch.columns().iter().zip(&columns) {
                let as_text = self.text_columns.iter().any(|c| c == column);
                let cells = decode_column(array, column, as_text)?;
                for (row, cell) in rows.iter_mut().zip(cells) {
                    row.push(cell);
                }
            }

            table.rows.extend(rows);

            if limit > 0 && table.len() >= limit {
                break;
            }
        }

        debug!(
            path = %path.display(),
            rows = table.len(),
            columns = table.columns.len(),
            "read parquet table"
        );
        Ok(table)
    }
}

impl Default for ParquetTableReader {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, column: &str) -> Result<&'a T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        ProcessingError::InvalidFormat(format!(
            "Unexpected array type {} for column '{}'",
            array.data_type(),
            column
        ))
    })
}

fn decode_text(bytes: &[u8], trim: bool) -> CellValue {
    let (text, _, _) = encoding_rs::UTF_8.decode(bytes);
    if trim {
        CellValue::Text(text.trim().to_string())
    } else {
        CellValue::Text(text.into_owned())
    }
}

/// Convert one Arrow column to cells.
fn decode_column(array: &ArrayRef, column: &str, as_text: bool) -> Result<Vec<CellValue>> {
    let len = array.len();
    let cells = match array.data_type() {
        DataType::Null => vec![CellValue::Null; len],
        DataType::Utf8 => {
            let values = downcast::<StringArray>(array, column)?;
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else if as_text {
                        CellValue::Text(values.value(i).trim().to_string())
                    } else {
                        CellValue::Text(values.value(i).to_string())
                    }
                })
                .collect()
        }
        DataType::LargeUtf8 => {
            let values = downcast::<LargeStringArray>(array, column)?;
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else if as_text {
                        CellValue::Text(values.value(i).trim().to_string())
                    } else {
                        CellValue::Text(values.value(i).to_string())
                    }
                })
                .collect()
        }
        DataType::Binary => {
            let values = downcast::<BinaryArray>(array, column)?;
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else if as_text {
                        decode_text(values.value(i), true)
                    } else {
                        CellValue::Bytes(values.value(i).to_vec())
                    }
                })
                .collect()
        }
        DataType::LargeBinary => {
            let values = downcast::<LargeBinaryArray>(array, column)?;
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else if as_text {
                        decode_text(values.value(i), true)
                    } else {
                        CellValue::Bytes(values.value(i).to_vec())
                    }
                })
                .collect()
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let widened = cast(array.as_ref(), &DataType::Int64)?;
            let values = downcast::<Int64Array>(&widened, column)?;
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Int(values.value(i))
                    }
                })
                .collect()
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 | DataType::Decimal128(_, _) => {
            let widened = cast(array.as_ref(), &DataType::Float64)?;
            let values = downcast::<Float64Array>(&widened, column)?;
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Float(values.value(i))
                    }
                })
                .collect()
        }
        DataType::Boolean => {
            let values = downcast::<BooleanArray>(array, column)?;
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Bool(values.value(i))
                    }
                })
                .collect()
        }
        DataType::Date32 => {
            let values = downcast::<Date32Array>(array, column)?;
            (0..len)
                .map(|i| {
                    values
                        .value_as_date(i)
                        .filter(|_| !values.is_null(i))
                        .map_or(CellValue::Null, CellValue::Date)
                })
                .collect()
        }
        DataType::Date64 => {
            let values = downcast::<Date64Array>(array, column)?;
            (0..len)
                .map(|i| {
                    values
                        .value_as_date(i)
                        .filter(|_| !values.is_null(i))
                        .map_or(CellValue::Null, CellValue::Date)
                })
                .collect()
        }
        DataType::Timestamp(unit, _) => {
            let datetimes: Vec<Option<chrono::NaiveDateTime>> = match unit {
                TimeUnit::Second => {
                    let values = downcast::<TimestampSecondArray>(array, column)?;
                    (0..len)
                        .map(|i| values.value_as_datetime(i).filter(|_| !values.is_null(i)))
                        .collect()
                }
                TimeUnit::Millisecond => {
                    let values = downcast::<TimestampMillisecondArray>(array, column)?;
                    (0..len)
                        .map(|i| values.value_as_datetime(i).filter(|_| !values.is_null(i)))
                        .collect()
                }
                TimeUnit::Microsecond => {
                    let values = downcast::<TimestampMicrosecondArray>(array, column)?;
                    (0..len)
                        .map(|i| values.value_as_datetime(i).filter(|_| !values.is_null(i)))
                        .collect()
                }
                TimeUnit::Nanosecond => {
                    let values = downcast::<TimestampNanosecondArray>(array, column)?;
                    (0..len)
                        .map(|i| values.value_as_datetime(i).filter(|_| !values.is_null(i)))
                        .collect()
                }
            };
            datetimes
                .into_iter()
                .map(|ts| ts.map_or(CellValue::Null, CellValue::Timestamp))
                .collect()
        }
        DataType::Dictionary(_, _) => {
            let values = cast(array.as_ref(), &DataType::Utf8)?;
            decode_column(&values, column, as_text)?
        }
        _ => {
            let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())?;
            (0..len)
                .map(|i| {
                    if array.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Text(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
    };

    Ok(cells)
}
