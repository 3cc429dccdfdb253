use serde::{Deserialize, Serialize};

/// One retained (mesh block, year) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyMetric {
    pub mesh_block_code: String,
    pub year: i32,
    pub median_price: f64,
    pub sales_count: usize,
    pub median_price_growth_yoy: Option<f64>,
}

impl YearlyMetric {
    pub fn new(
        mesh_block_code: String,
        year: i32,
        median_price: f64,
        sales_count: usize,
        median_price_growth_yoy: Option<f64>,
    ) -> Self {
        Self {
            mesh_block_code,
            year,
            median_price,
            sales_count,
            median_price_growth_yoy,
        }
    }
}

/// Average recent growth for a mesh block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub mesh_block_code: String,
    pub average_growth: f64,
}

/// Median price by year for a handful of mesh blocks.
///
/// `mesh_block_codes` holds the column order; each row carries one cell per
/// code, absent where that block had no retained row for the year.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    pub mesh_block_codes: Vec<String>,
    pub rows: Vec<PriceHistoryRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryRow {
    pub year: i32,
    pub median_prices: Vec<Option<f64>>,
}

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Series for one mesh block as (year, price) points, skipping gaps.
    pub fn series(&self, mesh_block_code: &str) -> Vec<(i32, f64)> {
        let Some(column) = self
            .mesh_block_codes
            .iter()
            .position(|code| code == mesh_block_code)
        else {
            return Vec::new();
        };

        self.rows
            .iter()
            .filter_map(|row| row.median_prices[column].map(|price| (row.year, price)))
            .collect()
    }
}
