pub mod growth_aggregator;
pub mod pipeline;
pub mod record_join;
pub mod transaction_cleaner;
pub mod value_parser;

pub use growth_aggregator::{AggregationOutput, GrowthAggregator};
pub use pipeline::{GrowthPipeline, PipelineOutput, PipelineReport};
pub use record_join::{JoinedTable, RecordJoiner};
pub use transaction_cleaner::{CleanedTransactions, DropCounts, TransactionCleaner};
pub use value_parser::{canonical_text, parse_price, parse_sale_date};
