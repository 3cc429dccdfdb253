pub mod csv_reader;
pub mod input_loader;
pub mod parquet_reader;

pub use csv_reader::CsvTableReader;
pub use input_loader::{InputLoader, InputTables};
pub use parquet_reader::ParquetTableReader;

use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Parquet,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("parquet") | Some("pq") => Ok(InputFormat::Parquet),
            Some("csv") | Some("txt") => Ok(InputFormat::Csv),
            _ => Err(ProcessingError::InvalidFormat(format!(
                "Cannot infer input format of {} (expected .parquet or .csv)",
                path.display()
            ))),
        }
    }
}

/// Fail early when a required input file is absent.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ProcessingError::InputNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Read any supported input file, decoding and trimming `text_columns`.
pub fn read_table(path: &Path, name: &str, text_columns: &[String]) -> Result<Table> {
    read_table_with_limit(path, name, text_columns, 0)
}

pub fn read_table_with_limit(
    path: &Path,
    name: &str,
    text_columns: &[String],
    limit: usize,
) -> Result<Table> {
    ensure_exists(path)?;
    match InputFormat::from_path(path)? {
        InputFormat::Parquet => ParquetTableReader::new()
            .with_text_columns(text_columns)
            .read_table_with_limit(path, name, limit),
        InputFormat::Csv => CsvTableReader::new()
            .with_text_columns(text_columns)
            .read_table_with_limit(path, name, limit),
    }
}
