use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::models::{PriceHistory, PriceHistoryRow, RankingEntry, YearlyMetric};
use crate::utils::constants::{DEFAULT_GROWTH_WINDOW_YEARS, DEFAULT_HISTORY_K, DEFAULT_TOP_K};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingResult {
    /// Top mesh blocks, ascending by average growth for bar presentation.
    pub ranked: Vec<RankingEntry>,
    /// Full price history of the leading mesh blocks; `None` without recent growth.
    pub history: Option<PriceHistory>,
    pub max_year: Option<i32>,
}

impl RankingResult {
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Ranks mesh blocks by mean YoY growth over the most recent years.
pub struct GrowthRanking {
    window_years: i32,
    top_k: usize,
    history_k: usize,
}

impl GrowthRanking {
    pub fn new(window_years: i32, top_k: usize) -> Self {
        Self {
            window_years,
            top_k,
            history_k: DEFAULT_HISTORY_K,
        }
    }

    pub fn with_history_k(mut self, history_k: usize) -> Self {
        self.history_k = history_k;
        self
    }

    /// Top `top_k` mesh blocks plus the price history of the top `history_k`.
    ///
    /// Selection is by mean growth descending with ties going to the lower
    /// mesh-block code; `ranked` is that selection reversed.
    pub fn rank_top(&self, metrics: &[YearlyMetric]) -> RankingResult {
        let Some(max_year) = metrics.iter().map(|m| m.year).max() else {
            return RankingResult::default();
        };

        let averages = self.average_recent_growth(metrics, max_year);
        if averages.is_empty() {
            info!(max_year, "no recent growth values to rank");
            return RankingResult {
                max_year: Some(max_year),
                ..Default::default()
            };
        }

        let leaders: Vec<String> = averages
            .iter()
            .take(self.history_k)
            .map(|entry| entry.mesh_block_code.clone())
            .collect();
        let mut ranked: Vec<RankingEntry> = averages.into_iter().take(self.top_k).collect();
        ranked.reverse();

        debug!(
            ranked = ranked.len(),
            leaders = ?leaders,
            "selected top growth areas"
        );

        RankingResult {
            ranked,
            history: Some(price_history(metrics, &leaders)),
            max_year: Some(max_year),
        }
    }

    /// Mean windowed growth per mesh block, best first.
    fn average_recent_growth(
        &self,
        metrics: &[YearlyMetric],
        max_year: i32,
    ) -> Vec<RankingEntry> {
        let cutoff = max_year - self.window_years;
        let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();

        for metric in metrics.iter().filter(|m| m.year > cutoff) {
            if let Some(growth) = metric.median_price_growth_yoy {
                let entry = sums.entry(metric.mesh_block_code.as_str()).or_default();
                entry.0 += growth;
                entry.1 += 1;
            }
        }

        let mut averages: Vec<RankingEntry> = sums
            .into_iter()
            .map(|(code, (sum, count))| RankingEntry {
                mesh_block_code: code.to_string(),
                average_growth: sum / count as f64,
            })
            .collect();

        averages.sort_by(|a, b| {
            b.average_growth
                .total_cmp(&a.average_growth)
                .then_with(|| a.mesh_block_code.cmp(&b.mesh_block_code))
        });
        averages
    }
}

impl Default for GrowthRanking {
    fn default() -> Self {
        Self::new(DEFAULT_GROWTH_WINDOW_YEARS, DEFAULT_TOP_K)
    }
}

/// Pivot the full metric history of `codes` into a year x mesh-block table.
pub fn price_history(metrics: &[YearlyMetric], codes: &[String]) -> PriceHistory {
    let columns: HashMap<&str, usize> = codes
        .iter()
        .enumerate()
        .map(|(i, code)| (code.as_str(), i))
        .collect();

    let mut by_year: BTreeMap<i32, Vec<Option<f64>>> = BTreeMap::new();
    for metric in metrics {
        if let Some(&column) = columns.get(metric.mesh_block_code.as_str()) {
            by_year
                .entry(metric.year)
                .or_insert_with(|| vec![None; codes.len()])[column] = Some(metric.median_price);
        }
    }

    PriceHistory {
        mesh_block_codes: codes.to_vec(),
        rows: by_year
            .into_iter()
            .map(|(year, median_prices)| PriceHistoryRow {
                year,
                median_prices,
            })
            .collect(),
    }
}
