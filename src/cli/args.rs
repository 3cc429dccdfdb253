use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;
use crate::utils::constants::DEFAULT_ROW_GROUP_SIZE;

#[derive(Parser)]
#[command(name = "mesh-growth")]
#[command(about = "Median sale price and year-over-year growth by mesh block")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Join, clean and aggregate sale transactions into per-mesh-block metrics
    Analyze {
        #[arg(short, long, help = "Transactions file (.parquet or .csv)")]
        transactions: PathBuf,

        #[arg(short, long, help = "Property lookup file (.parquet or .csv)")]
        properties: PathBuf,

        #[arg(long, help = "TOML configuration file")]
        config: Option<PathBuf>,

        #[arg(short, long, help = "Output directory [default: output]")]
        output_dir: Option<PathBuf>,

        #[arg(short, long, default_value = "csv", help = "Metrics format: csv or parquet")]
        format: String,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long, default_value_t = DEFAULT_ROW_GROUP_SIZE, help = "Rows per Parquet row group")]
        row_group_size: usize,

        #[arg(long, default_value = "false", help = "Do not write ranking/history CSVs")]
        skip_chart_data: bool,

        #[command(flatten)]
        columns: ColumnArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        ranking: RankingArgs,
    },

    /// Rank mesh blocks from a previously written metrics file
    Rank {
        #[arg(short, long, help = "Metrics file (.parquet or .csv)")]
        metrics: PathBuf,

        #[arg(long, help = "TOML configuration file")]
        config: Option<PathBuf>,

        #[arg(short, long, help = "Write chart data CSVs to this directory")]
        output_dir: Option<PathBuf>,

        #[arg(long, default_value = "false", help = "Print the ranking as JSON")]
        json: bool,

        #[command(flatten)]
        ranking: RankingArgs,
    },

    /// Display schema and sample rows of an input file
    Inspect {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}

/// Input column names.
#[derive(Args, Debug, Default, Clone)]
pub struct ColumnArgs {
    #[arg(long, help = "Property id column in the transactions file")]
    pub transaction_id_column: Option<String>,

    #[arg(long, help = "Property id column in the property file")]
    pub property_id_column: Option<String>,

    #[arg(long, help = "Mesh block code column in the property file")]
    pub mesh_block_column: Option<String>,

    #[arg(long)]
    pub price_column: Option<String>,

    #[arg(long)]
    pub date_column: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    #[arg(long, help = "Drop sales at or below this price")]
    pub min_price: Option<f64>,

    #[arg(long, help = "Minimum sales per mesh block and year")]
    pub min_sales: Option<usize>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RankingArgs {
    #[arg(long, help = "Years of growth averaged for the ranking")]
    pub window_years: Option<i32>,

    #[arg(long, help = "Number of mesh blocks ranked")]
    pub top_k: Option<usize>,

    #[arg(long, help = "Number of leaders in the price history")]
    pub history_k: Option<usize>,
}

impl RankingArgs {
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            growth_window_years: self.window_years,
            top_k: self.top_k,
            history_k: self.history_k,
            ..Default::default()
        }
    }
}

/// Merge the flag groups of `analyze` into one override set.
pub fn analysis_overrides(
    columns: &ColumnArgs,
    filters: &FilterArgs,
    ranking: &RankingArgs,
) -> ConfigOverrides {
    ConfigOverrides {
        transaction_property_id: columns.transaction_id_column.clone(),
        property_id: columns.property_id_column.clone(),
        mesh_block: columns.mesh_block_column.clone(),
        price: columns.price_column.clone(),
        sale_date: columns.date_column.clone(),
        min_price: filters.min_price,
        min_sales_count: filters.min_sales,
        ..ranking.to_overrides()
    }
}
