pub mod metrics;
pub mod sale;
pub mod table;

pub use metrics::{PriceHistory, PriceHistoryRow, RankingEntry, YearlyMetric};
pub use sale::SaleRecord;
pub use table::{CellValue, Table};
