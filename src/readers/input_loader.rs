use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::Result;
use crate::models::Table;
use crate::readers::read_table;
use crate::utils::constants::{PROPERTIES_TABLE, TRANSACTIONS_TABLE};

/// Both source tables of a run.
#[derive(Debug, Clone)]
pub struct InputTables {
    pub transactions: Table,
    pub properties: Table,
}

/// Reads the transaction and property files side by side.
pub struct InputLoader {
    text_columns: Vec<String>,
}

impl InputLoader {
    pub fn new(text_columns: Vec<String>) -> Self {
        Self { text_columns }
    }

    /// Load both inputs on blocking tasks; the first failure wins.
    pub async fn load(
        &self,
        transactions_path: &Path,
        properties_path: &Path,
    ) -> Result<InputTables> {
        let transactions_handle =
            self.spawn_read(transactions_path.to_path_buf(), TRANSACTIONS_TABLE);
        let properties_handle = self.spawn_read(properties_path.to_path_buf(), PROPERTIES_TABLE);

        let (transactions, properties) = tokio::try_join!(transactions_handle, properties_handle)?;
        let transactions = transactions?;
        let properties = properties?;

        info!(
            transactions = transactions.len(),
            properties = properties.len(),
            "loaded input tables"
        );

        Ok(InputTables {
            transactions,
            properties,
        })
    }

    fn spawn_read(&self, path: PathBuf, name: &'static str) -> JoinHandle<Result<Table>> {
        let text_columns = self.text_columns.clone();
        tokio::task::spawn_blocking(move || read_table(&path, name, &text_columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[tokio::test]
    async fn test_load_both_inputs() {
        let transactions = csv_file(&["gnaf_pid,price,date_sold", "P1,500000,2020-01-01"]);
        let properties = csv_file(&["gnaf_pid,mb_2016_code", "P1,MB1", "P2,MB2"]);

        let loader = InputLoader::new(vec!["gnaf_pid".to_string()]);
        let inputs = loader
            .load(transactions.path(), properties.path())
            .await
            .unwrap();

        assert_eq!(inputs.transactions.name, "transaction");
        assert_eq!(inputs.transactions.len(), 1);
        assert_eq!(inputs.properties.name, "property");
        assert_eq!(inputs.properties.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_processing() {
        let properties = csv_file(&["gnaf_pid,mb_2016_code", "P1,MB1"]);

        let loader = InputLoader::new(Vec::new());
        let err = loader
            .load(Path::new("/nonexistent/transactions.parquet"), properties.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::InputNotFound { .. }));
    }
}
