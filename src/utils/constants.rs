/// Default column names
pub const DEFAULT_PROPERTY_ID_COL: &str = "gnaf_pid";
pub const DEFAULT_MESH_BLOCK_COL: &str = "mb_2016_code";
pub const DEFAULT_PRICE_COL: &str = "price";
pub const DEFAULT_DATE_COL: &str = "date_sold";

/// Table names used in messages
pub const TRANSACTIONS_TABLE: &str = "transaction";
pub const PROPERTIES_TABLE: &str = "property";

/// Analysis defaults
pub const DEFAULT_MIN_PRICE: f64 = 10_000.0;
pub const DEFAULT_MIN_SALES_COUNT: usize = 3;
pub const DEFAULT_GROWTH_WINDOW_YEARS: i32 = 5;
pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_HISTORY_K: usize = 3;

/// Output column names
pub const COL_MESH_BLOCK_CODE: &str = "mesh_block_code";
pub const COL_YEAR: &str = "year";
pub const COL_MEDIAN_PRICE: &str = "median_price";
pub const COL_SALES_COUNT: &str = "sales_count";
pub const COL_GROWTH_YOY: &str = "median_price_growth_yoy";
pub const COL_AVERAGE_GROWTH: &str = "average_growth_yoy";

/// Output file names
pub const METRICS_FILE_STEM: &str = "median_price_growth_by_mesh_block";
pub const RANKING_FILE: &str = "top_growth_areas.csv";
pub const HISTORY_FILE: &str = "top_price_history.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "MESH_GROWTH";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_READ_BATCH_SIZE: usize = 8192;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
