use tracing::{debug, info};

use crate::error::Result;
use crate::models::SaleRecord;
use crate::processors::record_join::JoinedTable;
use crate::processors::value_parser::{canonical_text, parse_price, parse_sale_date};

/// Rows removed by the cleaner, by reason. A row is counted under the first
/// reason that applies, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub invalid_price: usize,
    pub invalid_date: usize,
    pub missing_mesh_block: usize,
    pub below_min_price: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.invalid_price + self.invalid_date + self.missing_mesh_block + self.below_min_price
    }
}

#[derive(Debug, Clone)]
pub struct CleanedTransactions {
    pub records: Vec<SaleRecord>,
    pub dropped: DropCounts,
}

impl CleanedTransactions {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct TransactionCleaner {
    property_id_column: String,
    price_column: String,
    date_column: String,
    min_price: f64,
}

impl TransactionCleaner {
    pub fn new(price_column: &str, date_column: &str, min_price: f64) -> Self {
        Self {
            property_id_column: String::new(),
            price_column: price_column.to_string(),
            date_column: date_column.to_string(),
            min_price,
        }
    }

    /// Carry the property identifier through to the sale records.
    pub fn with_property_id_column(mut self, column: &str) -> Self {
        self.property_id_column = column.to_string();
        self
    }

    /// Coerce price and date, drop unusable rows and derive the sale year.
    ///
    /// Bad cells never fail the call; only a missing column does.
    pub fn clean(&self, joined: &JoinedTable) -> Result<CleanedTransactions> {
        let table = &joined.table;
        let price_index = table.column_index(&self.price_column)?;
        let date_index = table.column_index(&self.date_column)?;
        let mesh_index = table.column_index(&joined.mesh_block_column)?;
        let property_index = if self.property_id_column.is_empty() {
            None
        } else {
            Some(table.column_index(&self.property_id_column)?)
        };

        let mut dropped = DropCounts::default();
        let mut records = Vec::with_capacity(table.len());

        for row in &table.rows {
            let Some(price) = parse_price(&row[price_index]) else {
                dropped.invalid_price += 1;
                continue;
            };
            let Some(sale_date) = parse_sale_date(&row[date_index]) else {
                dropped.invalid_date += 1;
                continue;
            };
            let Some(mesh_block_code) = canonical_text(&row[mesh_index])
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty())
            else {
                dropped.missing_mesh_block += 1;
                continue;
            };
            if price <= self.min_price {
                dropped.below_min_price += 1;
                continue;
            }

            let property_id = property_index
                .and_then(|index| canonical_text(&row[index]))
                .unwrap_or_default();

            records.push(SaleRecord::new(property_id, mesh_block_code, price, sale_date));
        }

        debug!(
            invalid_price = dropped.invalid_price,
            invalid_date = dropped.invalid_date,
            missing_mesh_block = dropped.missing_mesh_block,
            below_min_price = dropped.below_min_price,
            "cleaner drop reasons"
        );
        info!(
            kept = records.len(),
            dropped = dropped.total(),
            min_price = self.min_price,
            "cleaned transactions"
        );

        Ok(CleanedTransactions { records, dropped })
    }
}
