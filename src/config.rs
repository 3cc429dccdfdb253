use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::*;

/// Every tunable of a pipeline run. Passed by value into each stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalysisConfig {
    #[validate(nested)]
    pub columns: ColumnConfig,

    #[validate(nested)]
    pub thresholds: ThresholdConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnConfig {
    /// Property identifier column in the transaction table.
    #[validate(length(min = 1))]
    pub transaction_property_id: String,

    /// Property identifier column in the property lookup table.
    #[validate(length(min = 1))]
    pub property_id: String,

    #[validate(length(min = 1))]
    pub mesh_block: String,

    #[validate(length(min = 1))]
    pub price: String,

    #[validate(length(min = 1))]
    pub sale_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ThresholdConfig {
    #[validate(range(min = 0.0))]
    pub min_price: f64,

    #[validate(range(min = 1))]
    pub min_sales_count: usize,

    #[validate(range(min = 1))]
    pub growth_window_years: i32,

    #[validate(range(min = 1))]
    pub top_k: usize,

    #[validate(range(min = 1))]
    pub history_k: usize,
}

/// Values supplied on the command line; each one wins over file and env.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub transaction_property_id: Option<String>,
    pub property_id: Option<String>,
    pub mesh_block: Option<String>,
    pub price: Option<String>,
    pub sale_date: Option<String>,
    pub min_price: Option<f64>,
    pub min_sales_count: Option<usize>,
    pub growth_window_years: Option<i32>,
    pub top_k: Option<usize>,
    pub history_k: Option<usize>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            transaction_property_id: DEFAULT_PROPERTY_ID_COL.to_string(),
            property_id: DEFAULT_PROPERTY_ID_COL.to_string(),
            mesh_block: DEFAULT_MESH_BLOCK_COL.to_string(),
            price: DEFAULT_PRICE_COL.to_string(),
            sale_date: DEFAULT_DATE_COL.to_string(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_price: DEFAULT_MIN_PRICE,
            min_sales_count: DEFAULT_MIN_SALES_COUNT,
            growth_window_years: DEFAULT_GROWTH_WINDOW_YEARS,
            top_k: DEFAULT_TOP_K,
            history_k: DEFAULT_HISTORY_K,
        }
    }
}

impl AnalysisConfig {
    /// Layer built-in defaults, an optional TOML file and `MESH_GROWTH__*`
    /// environment variables, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default(
                "columns.transaction_property_id",
                defaults.columns.transaction_property_id,
            )?
            .set_default("columns.property_id", defaults.columns.property_id)?
            .set_default("columns.mesh_block", defaults.columns.mesh_block)?
            .set_default("columns.price", defaults.columns.price)?
            .set_default("columns.sale_date", defaults.columns.sale_date)?
            .set_default("thresholds.min_price", defaults.thresholds.min_price)?
            .set_default(
                "thresholds.min_sales_count",
                defaults.thresholds.min_sales_count as i64,
            )?
            .set_default(
                "thresholds.growth_window_years",
                defaults.thresholds.growth_window_years as i64,
            )?
            .set_default("thresholds.top_k", defaults.thresholds.top_k as i64)?
            .set_default("thresholds.history_k", defaults.thresholds.history_k as i64)?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(ProcessingError::InputNotFound {
                    path: path.to_path_buf(),
                });
            }
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AnalysisConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        let columns = &mut self.columns;
        if let Some(value) = &overrides.transaction_property_id {
            columns.transaction_property_id = value.clone();
        }
        if let Some(value) = &overrides.property_id {
            columns.property_id = value.clone();
        }
        if let Some(value) = &overrides.mesh_block {
            columns.mesh_block = value.clone();
        }
        if let Some(value) = &overrides.price {
            columns.price = value.clone();
        }
        if let Some(value) = &overrides.sale_date {
            columns.sale_date = value.clone();
        }

        let thresholds = &mut self.thresholds;
        if let Some(value) = overrides.min_price {
            thresholds.min_price = value;
        }
        if let Some(value) = overrides.min_sales_count {
            thresholds.min_sales_count = value;
        }
        if let Some(value) = overrides.growth_window_years {
            thresholds.growth_window_years = value;
        }
        if let Some(value) = overrides.top_k {
            thresholds.top_k = value;
        }
        if let Some(value) = overrides.history_k {
            thresholds.history_k = value;
        }

        self.validate()?;
        Ok(self)
    }

    /// Columns that may arrive as raw bytes and must be decoded and trimmed on load.
    pub fn identifier_columns(&self) -> Vec<String> {
        vec![
            self.columns.transaction_property_id.clone(),
            self.columns.property_id.clone(),
        ]
    }
}
