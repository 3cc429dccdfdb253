use std::io::Write;
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::{PriceHistory, RankingEntry, YearlyMetric};
use crate::utils::constants::*;

/// Writes the metrics table and the chart-data tables as CSV.
///
/// Medians carry no decimals, growth values two; absent values are empty
/// fields. Output for a given input is byte-for-byte stable.
pub struct CsvMetricsWriter;

impl CsvMetricsWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_metrics(&self, metrics: &[YearlyMetric], path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_metrics_to(metrics, file)
    }

    pub fn metrics_to_string(&self, metrics: &[YearlyMetric]) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_metrics_to(metrics, &mut buffer)?;
        into_string(buffer)
    }

    pub fn write_metrics_to<W: Write>(&self, metrics: &[YearlyMetric], sink: W) -> Result<()> {
        let mut writer = self.writer(sink);
        writer.write_record([
            COL_MESH_BLOCK_CODE,
            COL_YEAR,
            COL_MEDIAN_PRICE,
            COL_SALES_COUNT,
            COL_GROWTH_YOY,
        ])?;

        for metric in metrics {
            writer.write_record([
                metric.mesh_block_code.clone(),
                metric.year.to_string(),
                format_decimal(metric.median_price, 0),
                metric.sales_count.to_string(),
                metric
                    .median_price_growth_yoy
                    .map(|growth| format_decimal(growth, 2))
                    .unwrap_or_default(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Ranked mesh blocks in presentation order.
    pub fn write_ranking(&self, ranking: &[RankingEntry], path: &Path) -> Result<()> {
        let mut writer = self.writer(std::fs::File::create(path)?);
        writer.write_record([COL_MESH_BLOCK_CODE, COL_AVERAGE_GROWTH])?;

        for entry in ranking {
            writer.write_record([
                entry.mesh_block_code.clone(),
                format_decimal(entry.average_growth, 2),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Year rows with one median-price column per mesh block.
    pub fn write_price_history(&self, history: &PriceHistory, path: &Path) -> Result<()> {
        let mut writer = self.writer(std::fs::File::create(path)?);

        let mut header = vec![COL_YEAR.to_string()];
        header.extend(history.mesh_block_codes.iter().cloned());
        writer.write_record(&header)?;

        for row in &history.rows {
            let mut record = vec![row.year.to_string()];
            record.extend(
                row.median_prices
                    .iter()
                    .map(|price| price.map(|p| format_decimal(p, 0)).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Read a metrics CSV produced by [`CsvMetricsWriter::write_metrics`].
    pub fn read_metrics(&self, path: &Path) -> Result<Vec<YearlyMetric>> {
        crate::readers::ensure_exists(path)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        for column in [
            COL_MESH_BLOCK_CODE,
            COL_YEAR,
            COL_MEDIAN_PRICE,
            COL_SALES_COUNT,
            COL_GROWTH_YOY,
        ] {
            if !headers.iter().any(|h| h == column) {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Metrics file {} is missing column '{}'",
                    path.display(),
                    column
                )));
            }
        }

        let mut metrics = Vec::new();
        for record in reader.deserialize() {
            let metric: YearlyMetric = record?;
            metrics.push(metric);
        }
        Ok(metrics)
    }

    fn writer<W: Write>(&self, sink: W) -> csv::Writer<W> {
        csv::Writer::from_writer(sink)
    }
}

impl Default for CsvMetricsWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-decimal rendering without a negative sign on zero.
fn format_decimal(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    if formatted.starts_with('-') && formatted[1..].chars().all(|c| c == '0' || c == '.') {
        formatted[1..].to_string()
    } else {
        formatted
    }
}

fn into_string(buffer: Vec<u8>) -> Result<String> {
    String::from_utf8(buffer)
        .map_err(|e| ProcessingError::InvalidFormat(format!("CSV output is not UTF-8: {}", e)))
}
