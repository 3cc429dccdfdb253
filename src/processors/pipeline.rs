use tracing::info;

use crate::config::AnalysisConfig;
use crate::error::{PipelineStage, ProcessingError, Result};
use crate::models::{Table, YearlyMetric};
use crate::processors::{DropCounts, GrowthAggregator, RecordJoiner, TransactionCleaner};
use crate::utils::progress::ProgressReporter;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub transaction_rows: usize,
    pub property_rows: usize,
    pub joined_rows: usize,
    pub dropped: DropCounts,
    pub clean_rows: usize,
    pub groups_total: usize,
    pub low_volume_removed: usize,
    pub metric_rows: usize,
    pub mesh_blocks: usize,
}

impl PipelineReport {
    pub fn unmatched_rows(&self) -> usize {
        self.transaction_rows.saturating_sub(self.joined_rows)
    }

    /// Human-readable run summary
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Mesh Block Growth Report ===\n");
        summary.push_str(&format!("Transactions Loaded: {}\n", self.transaction_rows));
        summary.push_str(&format!("Properties Loaded: {}\n", self.property_rows));
        summary.push_str(&format!(
            "Merged Transactions: {} ({} unmatched)\n",
            self.joined_rows,
            self.unmatched_rows()
        ));
        summary.push_str(&format!(
            "Clean Transactions: {} ({:.1}% of merged)\n",
            self.clean_rows,
            percentage(self.clean_rows, self.joined_rows)
        ));
        summary.push_str(&format!(
            "  Invalid Price: {}\n  Invalid Date: {}\n  Missing Mesh Block: {}\n  At/Below Minimum Price: {}\n",
            self.dropped.invalid_price,
            self.dropped.invalid_date,
            self.dropped.missing_mesh_block,
            self.dropped.below_min_price
        ));
        summary.push_str(&format!(
            "Mesh Block Years: {} ({} low-volume removed)\n",
            self.groups_total, self.low_volume_removed
        ));
        summary.push_str(&format!(
            "Metric Rows: {} across {} mesh blocks\n",
            self.metric_rows, self.mesh_blocks
        ));

        summary
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub metrics: Vec<YearlyMetric>,
    pub report: PipelineReport,
}

/// Join -> clean -> aggregate over in-memory tables.
pub struct GrowthPipeline {
    config: AnalysisConfig,
}

impl GrowthPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run the core stages. Fails before aggregation if the join or the
    /// cleaner leaves nothing to aggregate.
    pub fn run(
        &self,
        transactions: &Table,
        properties: &Table,
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutput> {
        let columns = &self.config.columns;
        let thresholds = &self.config.thresholds;
        let mut report = PipelineReport {
            transaction_rows: transactions.len(),
            property_rows: properties.len(),
            ..Default::default()
        };

        if let Some(p) = progress {
            p.set_message("Merging transactions with property lookup...");
        }
        let joiner = RecordJoiner::new(
            &columns.transaction_property_id,
            &columns.property_id,
            &columns.mesh_block,
        );
        let joined = joiner.join(transactions, properties)?;
        report.joined_rows = joined.len();

        if let Some(p) = progress {
            p.set_message("Cleaning transactions...");
        }
        let cleaner = TransactionCleaner::new(&columns.price, &columns.sale_date, thresholds.min_price)
            .with_property_id_column(&columns.transaction_property_id);
        let cleaned = cleaner.clean(&joined)?;
        report.dropped = cleaned.dropped.clone();
        report.clean_rows = cleaned.records.len();

        if cleaned.is_empty() {
            return Err(ProcessingError::empty_result(
                PipelineStage::Clean,
                format!(
                    "all {} merged transactions were dropped ({} invalid price, {} invalid date, {} missing mesh block, {} at or below {})",
                    joined.len(),
                    cleaned.dropped.invalid_price,
                    cleaned.dropped.invalid_date,
                    cleaned.dropped.missing_mesh_block,
                    cleaned.dropped.below_min_price,
                    thresholds.min_price
                ),
            ));
        }

        if let Some(p) = progress {
            p.set_message("Aggregating yearly metrics...");
        }
        let aggregated = GrowthAggregator::new(thresholds.min_sales_count).aggregate(&cleaned.records);
        report.groups_total = aggregated.groups_total;
        report.low_volume_removed = aggregated.low_volume_removed;
        report.metric_rows = aggregated.metrics.len();
        report.mesh_blocks = aggregated.mesh_block_count();

        info!(
            rows = report.metric_rows,
            mesh_blocks = report.mesh_blocks,
            "pipeline complete"
        );

        Ok(PipelineOutput {
            metrics: aggregated.metrics,
            report,
        })
    }
}
