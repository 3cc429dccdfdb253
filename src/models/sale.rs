use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A transaction that survived cleaning and is attributed to a mesh block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub property_id: String,
    pub mesh_block_code: String,
    pub price: f64,

    pub sale_date: NaiveDate,
    pub year: i32,
}

impl SaleRecord {
    pub fn new(
        property_id: String,
        mesh_block_code: String,
        price: f64,
        sale_date: NaiveDate,
    ) -> Self {
        Self {
            property_id,
            mesh_block_code,
            price,
            sale_date,
            year: sale_date.year(),
        }
    }
}
