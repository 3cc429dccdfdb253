use std::collections::HashMap;
use tracing::{debug, info};

use crate::models::{SaleRecord, YearlyMetric};

#[derive(Debug, Clone)]
pub struct AggregationOutput {
    pub metrics: Vec<YearlyMetric>,
    pub groups_total: usize,
    pub low_volume_removed: usize,
}

impl AggregationOutput {
    pub fn mesh_block_count(&self) -> usize {
        let mut count = 0;
        let mut previous: Option<&str> = None;
        for metric in &self.metrics {
            if previous != Some(metric.mesh_block_code.as_str()) {
                count += 1;
                previous = Some(metric.mesh_block_code.as_str());
            }
        }
        count
    }
}

/// Median price and YoY growth per (mesh block, year).
pub struct GrowthAggregator {
    min_sales_count: usize,
}

impl GrowthAggregator {
    pub fn new(min_sales_count: usize) -> Self {
        Self { min_sales_count }
    }

    /// Group, filter low-volume years, then scan each mesh block in year order.
    ///
    /// Growth compares each row with the previous *retained* row of the same
    /// mesh block, so a dropped year is bridged rather than breaking the chain.
    /// A zero predecessor median, or any non-finite ratio, yields no growth.
    pub fn aggregate(&self, records: &[SaleRecord]) -> AggregationOutput {
        let grouped = self.group_by_mesh_block_and_year(records);
        let groups_total = grouped.len();

        let mut groups: Vec<((String, i32), Vec<f64>)> = grouped
            .into_iter()
            .filter(|(_, prices)| prices.len() >= self.min_sales_count)
            .collect();
        let low_volume_removed = groups_total - groups.len();

        // The growth scan below depends on this order.
        groups.sort_by(|((code_a, year_a), _), ((code_b, year_b), _)| {
            code_a.cmp(code_b).then_with(|| year_a.cmp(year_b))
        });

        let mut metrics = Vec::with_capacity(groups.len());
        let mut previous: Option<(&str, f64)> = None;

        for ((code, year), prices) in &groups {
            let median = median(prices);
            let growth = match previous {
                Some((previous_code, previous_median)) if previous_code == code.as_str() => {
                    percent_change(previous_median, median)
                }
                _ => None,
            };
            previous = Some((code.as_str(), median));

            metrics.push(YearlyMetric::new(
                code.clone(),
                *year,
                round_ties_even(median, 0),
                prices.len(),
                growth.map(|g| round_ties_even(g, 2)),
            ));
        }

        debug!(
            groups = groups_total,
            min_sales_count = self.min_sales_count,
            "grouped sales by mesh block and year"
        );
        info!(
            rows = metrics.len(),
            low_volume_removed, "aggregated yearly metrics"
        );

        AggregationOutput {
            metrics,
            groups_total,
            low_volume_removed,
        }
    }

    fn group_by_mesh_block_and_year(
        &self,
        records: &[SaleRecord],
    ) -> HashMap<(String, i32), Vec<f64>> {
        let mut grouped: HashMap<(String, i32), Vec<f64>> = HashMap::new();
        for record in records {
            grouped
                .entry((record.mesh_block_code.clone(), record.year))
                .or_default()
                .push(record.price);
        }
        grouped
    }
}

impl Default for GrowthAggregator {
    fn default() -> Self {
        Self::new(crate::utils::constants::DEFAULT_MIN_SALES_COUNT)
    }
}

/// Middle value of the sorted prices; even counts average the two middle values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Percentage change from `previous` to `current`, absent when undefined.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    let change = (current / previous - 1.0) * 100.0;
    change.is_finite().then_some(change)
}

/// Round half to even at `decimals` places.
pub fn round_ties_even(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
