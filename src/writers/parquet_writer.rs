use crate::error::{ProcessingError, Result};
use crate::models::YearlyMetric;
use crate::utils::constants::*;
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write the metrics table; an empty table still produces a file with the schema.
    pub fn write_metrics(&self, metrics: &[YearlyMetric], path: &Path) -> Result<()> {
        let schema = metrics_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in metrics.chunks(self.row_group_size.max(1)) {
            let batch = metrics_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Read back a metrics file written by [`ParquetWriter::write_metrics`].
    pub fn read_metrics(&self, path: &Path) -> Result<Vec<YearlyMetric>> {
        crate::readers::ensure_exists(path)?;

        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(DEFAULT_READ_BATCH_SIZE)
            .build()?;

        let mut metrics = Vec::new();

        for batch_result in reader {
            let batch = batch_result?;

            let codes = column::<StringArray>(&batch, COL_MESH_BLOCK_CODE)?;
            let years = column::<Int32Array>(&batch, COL_YEAR)?;
            let medians = column::<Float64Array>(&batch, COL_MEDIAN_PRICE)?;
            let counts = column::<UInt64Array>(&batch, COL_SALES_COUNT)?;
            let growths = column::<Float64Array>(&batch, COL_GROWTH_YOY)?;

            for i in 0..batch.num_rows() {
                metrics.push(YearlyMetric::new(
                    codes.value(i).to_string(),
                    years.value(i),
                    medians.value(i),
                    counts.value(i) as usize,
                    if growths.is_null(i) {
                        None
                    } else {
                        Some(growths.value(i))
                    },
                ));
            }
        }

        Ok(metrics)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        crate::readers::ensure_exists(path)?;

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let mut row_group_sizes = Vec::new();
        let mut compression = None;
        for i in 0..row_groups {
            let rg_metadata = metadata.row_group(i);
            row_group_sizes.push(rg_metadata.num_rows());
            if compression.is_none() && rg_metadata.num_columns() > 0 {
                compression = Some(rg_metadata.column(0).compression());
            }
        }

        let columns = file_metadata
            .schema_descr()
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: compression.unwrap_or(self.compression),
            columns,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn metrics_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(COL_MESH_BLOCK_CODE, DataType::Utf8, false),
        Field::new(COL_YEAR, DataType::Int32, false),
        Field::new(COL_MEDIAN_PRICE, DataType::Float64, false),
        Field::new(COL_SALES_COUNT, DataType::UInt64, false),
        Field::new(COL_GROWTH_YOY, DataType::Float64, true),
    ]))
}

fn metrics_to_batch(metrics: &[YearlyMetric], schema: Arc<Schema>) -> Result<RecordBatch> {
    let codes: Vec<&str> = metrics.iter().map(|m| m.mesh_block_code.as_str()).collect();
    let years: Vec<i32> = metrics.iter().map(|m| m.year).collect();
    let medians: Vec<f64> = metrics.iter().map(|m| m.median_price).collect();
    let counts: Vec<u64> = metrics.iter().map(|m| m.sales_count as u64).collect();
    let growths: Vec<Option<f64>> = metrics.iter().map(|m| m.median_price_growth_yoy).collect();

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(codes)),
            Arc::new(Int32Array::from(years)),
            Arc::new(Float64Array::from(medians)),
            Arc::new(UInt64Array::from(counts)),
            Arc::new(Float64Array::from(growths)),
        ],
    )?;

    Ok(batch)
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|array| array.as_any().downcast_ref::<T>())
        .ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "Metrics file is missing column '{}' or it has the wrong type",
                name
            ))
        })
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
    pub columns: Vec<String>,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n  Total rows: {}\n  Row groups: {}\n  File size: {:.2} MB\n  Compression: {:?}\n  Columns: {}\n  Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            self.columns.join(", "),
            if self.row_groups > 0 {
                self.total_rows as f64 / self.row_groups as f64
            } else {
                0.0
            }
        )
    }
}
