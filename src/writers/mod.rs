pub mod csv_writer;
pub mod parquet_writer;

pub use csv_writer::CsvMetricsWriter;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};

use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::YearlyMetric;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(OutputFormat::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => Ok(OutputFormat::Parquet),
            _ => Err(ProcessingError::InvalidFormat(format!(
                "Cannot infer metrics format of {} (expected .csv or .parquet)",
                path.display()
            ))),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(ProcessingError::Config(format!(
                "Unsupported output format: {}",
                other
            ))),
        }
    }
}

/// Load a metrics table written by either writer, chosen by extension.
pub fn read_metrics(path: &Path) -> Result<Vec<YearlyMetric>> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Csv => CsvMetricsWriter::new().read_metrics(path),
        OutputFormat::Parquet => ParquetWriter::new().read_metrics(path),
    }
}
