use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::analyzers::{GrowthRanking, RankingResult};
use crate::cli::args::{analysis_overrides, Cli, Commands};
use crate::config::{AnalysisConfig, ThresholdConfig};
use crate::models::YearlyMetric;
use crate::processors::GrowthPipeline;
use crate::readers::{read_table, read_table_with_limit, InputFormat, InputLoader};
use crate::utils::progress::ProgressReporter;
use crate::utils::{
    default_output_dir, history_output_path, init_logging, metrics_output_path,
    ranking_output_path,
};
use crate::writers::{read_metrics, CsvMetricsWriter, OutputFormat, ParquetWriter};

const PREVIEW_ROWS: usize = 10;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Analyze {
            transactions,
            properties,
            config,
            output_dir,
            format,
            compression,
            row_group_size,
            skip_chart_data,
            columns,
            filters,
            ranking,
        } => {
            let config = AnalysisConfig::load(config.as_deref())
                .context("failed to load configuration")?
                .with_overrides(&analysis_overrides(&columns, &filters, &ranking))?;
            let format: OutputFormat = format.parse()?;
            let parquet_writer = ParquetWriter::new()
                .with_compression(&compression)?
                .with_row_group_size(row_group_size);
            let output_dir = output_dir.unwrap_or_else(default_output_dir);

            println!("Analyzing mesh block sale prices...");
            println!("Transactions: {}", transactions.display());
            println!("Properties: {}", properties.display());

            let progress = ProgressReporter::new_spinner("Loading input tables...", false);

            let inputs = InputLoader::new(config.identifier_columns())
                .load(&transactions, &properties)
                .await?;

            let pipeline = GrowthPipeline::new(config.clone());
            let output = pipeline.run(&inputs.transactions, &inputs.properties, Some(&progress))?;

            progress.finish_with_message(&format!(
                "Computed {} metric rows",
                output.metrics.len()
            ));
            println!("\n{}", output.report.summary());

            std::fs::create_dir_all(&output_dir).with_context(|| {
                format!("failed to create output directory {}", output_dir.display())
            })?;
            let metrics_path = metrics_output_path(&output_dir, format.extension());
            match format {
                OutputFormat::Csv => {
                    CsvMetricsWriter::new().write_metrics(&output.metrics, &metrics_path)?
                }
                OutputFormat::Parquet => {
                    parquet_writer.write_metrics(&output.metrics, &metrics_path)?;
                    let file_info = parquet_writer.get_file_info(&metrics_path)?;
                    println!("{}\n", file_info.summary());
                }
            }
            println!("Metrics written to {}", metrics_path.display());

            print_preview(&output.metrics);

            let ranking = ranking_for(&config.thresholds).rank_top(&output.metrics);
            print_ranking(&ranking, config.thresholds.growth_window_years);
            if !skip_chart_data {
                write_chart_data(&ranking, &output_dir);
            }

            println!("Analysis complete!");
        }

        Commands::Rank {
            metrics,
            config,
            output_dir,
            json,
            ranking,
        } => {
            let config = AnalysisConfig::load(config.as_deref())
                .context("failed to load configuration")?
                .with_overrides(&ranking.to_overrides())?;

            let rows = read_metrics(&metrics)
                .with_context(|| format!("failed to read metrics from {}", metrics.display()))?;
            info!(rows = rows.len(), path = %metrics.display(), "loaded metrics");

            let ranking = ranking_for(&config.thresholds).rank_top(&rows);
            if json {
                println!("{}", serde_json::to_string_pretty(&ranking)?);
            } else {
                print_ranking(&ranking, config.thresholds.growth_window_years);
            }

            if let Some(output_dir) = output_dir {
                std::fs::create_dir_all(&output_dir)?;
                write_chart_data(&ranking, &output_dir);
            }
        }

        Commands::Inspect { file, sample } => {
            inspect(&file, sample)?;
        }
    }

    Ok(())
}

fn ranking_for(thresholds: &ThresholdConfig) -> GrowthRanking {
    GrowthRanking::new(thresholds.growth_window_years, thresholds.top_k)
        .with_history_k(thresholds.history_k)
}

fn print_preview(metrics: &[YearlyMetric]) {
    println!("\nFirst {} rows:", PREVIEW_ROWS.min(metrics.len()));
    println!(
        "{:<16} {:>6} {:>14} {:>6} {:>10}",
        "mesh_block_code", "year", "median_price", "sales", "growth_%"
    );
    for metric in metrics.iter().take(PREVIEW_ROWS) {
        println!(
            "{:<16} {:>6} {:>14.0} {:>6} {:>10}",
            metric.mesh_block_code,
            metric.year,
            metric.median_price,
            metric.sales_count,
            metric
                .median_price_growth_yoy
                .map(|g| format!("{:.2}", g))
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

fn print_ranking(ranking: &RankingResult, window_years: i32) {
    let Some(max_year) = ranking.max_year else {
        warn!("no metrics to rank");
        return;
    };

    if ranking.is_empty() {
        warn!(
            max_year,
            window_years, "no growth values in the ranking window; skipping ranking"
        );
        return;
    }

    println!(
        "\nTop {} mesh blocks by average YoY growth ({}-{}):",
        ranking.ranked.len(),
        max_year - window_years + 1,
        max_year
    );
    for (i, entry) in ranking.ranked.iter().rev().enumerate() {
        println!(
            "{:>3}. {:<16} {:>8.2}%",
            i + 1,
            entry.mesh_block_code,
            entry.average_growth
        );
    }
}

/// Chart-data files are best effort; failures are logged and skipped.
fn write_chart_data(ranking: &RankingResult, output_dir: &Path) {
    if ranking.is_empty() {
        return;
    }

    let writer = CsvMetricsWriter::new();

    let ranking_path = ranking_output_path(output_dir);
    match writer.write_ranking(&ranking.ranked, &ranking_path) {
        Ok(()) => println!("Ranking written to {}", ranking_path.display()),
        Err(e) => warn!(error = %e, path = %ranking_path.display(), "skipping ranking chart data"),
    }

    if let Some(history) = ranking.history.as_ref().filter(|h| !h.is_empty()) {
        let history_path = history_output_path(output_dir);
        match writer.write_price_history(history, &history_path) {
            Ok(()) => println!("Price history written to {}", history_path.display()),
            Err(e) => {
                warn!(error = %e, path = %history_path.display(), "skipping price history chart data")
            }
        }
    }
}

fn inspect(file: &Path, sample: usize) -> Result<()> {
    println!("Inspecting input file: {}", file.display());

    let text_columns = AnalysisConfig::default().identifier_columns();
    let name = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (table, total_rows) = match InputFormat::from_path(file)? {
        InputFormat::Parquet => {
            let file_info = ParquetWriter::new().get_file_info(file)?;
            println!("\n{}", file_info.summary());
            let table = read_table_with_limit(file, &name, &text_columns, sample.max(1))?;
            (table, file_info.total_rows as usize)
        }
        InputFormat::Csv => {
            let table = read_table(file, &name, &text_columns)?;
            let total = table.len();
            (table, total)
        }
    };

    println!("\nColumns ({}): {}", table.columns.len(), table.columns.join(", "));
    println!("Rows: {}", total_rows);

    if sample > 0 {
        println!("\nSample Records (showing up to {} records):", sample);
        for (i, row) in table.rows.iter().take(sample).enumerate() {
            let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            println!("{}. {}", i + 1, cells.join(" | "));
        }
    }

    Ok(())
}
