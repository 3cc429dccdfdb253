use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{PipelineStage, ProcessingError, Result};
use crate::models::{CellValue, Table};
use crate::processors::value_parser::canonical_text;

/// Transactions with the mesh-block code of their property appended.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTable {
    pub table: Table,
    pub mesh_block_column: String,
}

impl JoinedTable {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Inner join of transactions onto the property lookup.
pub struct RecordJoiner {
    transaction_key: String,
    property_key: String,
    mesh_block_column: String,
}

impl RecordJoiner {
    pub fn new(transaction_key: &str, property_key: &str, mesh_block_column: &str) -> Self {
        Self {
            transaction_key: transaction_key.to_string(),
            property_key: property_key.to_string(),
            mesh_block_column: mesh_block_column.to_string(),
        }
    }

    /// Join transactions to their mesh block. Properties are deduplicated by
    /// key with the first occurrence winning; unmatched transactions are dropped.
    pub fn join(&self, transactions: &Table, properties: &Table) -> Result<JoinedTable> {
        let mesh_index = properties.column_index(&self.mesh_block_column)?;
        let property_key_index = properties.column_index(&self.property_key)?;
        let transaction_key_index = transactions.column_index(&self.transaction_key)?;

        if transactions.has_column(&self.mesh_block_column) {
            return Err(ProcessingError::Config(format!(
                "column '{}' exists in both the {} and {} tables",
                self.mesh_block_column, transactions.name, properties.name
            )));
        }

        let lookup = self.build_lookup(properties, property_key_index, mesh_index);

        let mut columns = transactions.columns.clone();
        columns.push(self.mesh_block_column.clone());
        let mut joined = Table::new(transactions.name.clone(), columns);

        for row in &transactions.rows {
            let Some(key) = canonical_text(&row[transaction_key_index]) else {
                continue;
            };
            if let Some(mesh_block) = lookup.get(&key) {
                let mut joined_row = row.clone();
                joined_row.push((*mesh_block).clone());
                joined.rows.push(joined_row);
            }
        }

        let unmatched = transactions.len() - joined.len();
        info!(
            joined = joined.len(),
            unmatched,
            "merged transactions with property lookup"
        );

        if joined.is_empty() {
            return Err(ProcessingError::empty_result(
                PipelineStage::Join,
                format!(
                    "none of {} transactions matched a property on '{}' = '{}'",
                    transactions.len(),
                    self.transaction_key,
                    self.property_key
                ),
            ));
        }

        Ok(JoinedTable {
            table: joined,
            mesh_block_column: self.mesh_block_column.clone(),
        })
    }

    /// Key -> mesh-block cell, first occurrence of each key wins.
    fn build_lookup<'a>(
        &self,
        properties: &'a Table,
        key_index: usize,
        mesh_index: usize,
    ) -> HashMap<String, &'a CellValue> {
        let mut lookup = HashMap::with_capacity(properties.len());
        let mut duplicates = 0usize;

        for row in &properties.rows {
            let Some(key) = canonical_text(&row[key_index]) else {
                continue;
            };
            if lookup.contains_key(&key) {
                duplicates += 1;
                continue;
            }
            lookup.insert(key, &row[mesh_index]);
        }

        debug!(
            properties = lookup.len(),
            duplicates, "built property lookup"
        );
        lookup
    }
}
