use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::models::{CellValue, Table};
use crate::readers::ensure_exists;

/// Loads a delimited text file with a header row. Every cell is text;
/// empty cells are null.
pub struct CsvTableReader {
    text_columns: Vec<String>,
}

impl CsvTableReader {
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

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let columns: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let trimmed: Vec<bool> = columns
            .iter()
            .map(|column| self.text_columns.contains(column))
            .collect();

        let mut table = Table::new(name, columns);
        for record in reader.records() {
            let record = record?;
            let row = record
                .iter()
                .zip(&trimmed)
                .map(|(value, trim)| {
                    if *trim {
                        CellValue::text_or_null(value.trim())
                    } else {
                        CellValue::text_or_null(value)
                    }
                })
                .collect();
            table.push_row(row)?;

            if limit > 0 && table.len() >= limit {
                break;
            }
        }

        debug!(path = %path.display(), rows = table.len(), "read csv table");
        Ok(table)
    }
}

impl Default for CsvTableReader {
    fn default() -> Self {
        Self::new()
    }
}
