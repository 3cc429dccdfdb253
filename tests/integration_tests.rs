use arrow::array::{ArrayRef, BinaryArray, Date32Array, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use clap::Parser;
use mesh_growth::cli::{run, Cli};
use mesh_growth::config::{AnalysisConfig, ConfigOverrides};
use mesh_growth::error::{PipelineStage, ProcessingError};
use mesh_growth::processors::GrowthPipeline;
use mesh_growth::readers::InputLoader;
use mesh_growth::writers::{read_metrics, CsvMetricsWriter};
use parquet::arrow::ArrowWriter;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const EXPECTED_METRICS_CSV: &str = "\
mesh_block_code,year,median_price,sales_count,median_price_growth_yoy
10001,2018,200000,3,
10001,2019,230000,3,15.00
10001,2020,253000,3,10.00
10002,2019,500000,3,
10002,2020,550000,3,10.00
";

type Sale = (&'static str, Option<f64>, Option<(i32, u32, u32)>);

fn sales() -> Vec<Sale> {
    vec![
        (" P1 ", Some(100_000.0), Some((2018, 2, 1))),
        ("P2  ", Some(200_000.0), Some((2018, 5, 9))),
        ("P3", Some(300_000.0), Some((2018, 11, 30))),
        ("P1", Some(220_000.0), Some((2019, 1, 15))),
        ("P2", Some(230_000.0), Some((2019, 6, 1))),
        ("P3", Some(240_000.0), Some((2019, 12, 31))),
        ("P1", Some(250_000.0), Some((2020, 3, 3))),
        ("P2", Some(253_000.0), Some((2020, 4, 4))),
        ("P3", Some(260_000.0), Some((2020, 5, 5))),
        ("P4", Some(400_000.0), Some((2019, 2, 2))),
        ("P5", Some(500_000.0), Some((2019, 3, 3))),
        ("P6", Some(600_000.0), Some((2019, 4, 4))),
        ("P4", Some(540_000.0), Some((2020, 2, 2))),
        ("P5", Some(550_000.0), Some((2020, 3, 3))),
        ("P6", Some(560_000.0), Some((2020, 4, 4))),
        // low volume year
        ("P4", Some(700_000.0), Some((2021, 1, 1))),
        ("P5", Some(710_000.0), Some((2021, 2, 1))),
        // dropped by the cleaner
        ("P1", Some(5_000.0), Some((2020, 6, 1))),
        ("P2", None, Some((2020, 7, 1))),
        ("P3", Some(300_000.0), None),
        // no property
        ("P9", Some(300_000.0), Some((2020, 1, 1))),
    ]
}

fn properties() -> Vec<(&'static str, i64)> {
    vec![
        ("P1  ", 10001),
        ("P2", 10001),
        (" P3", 10001),
        ("P4", 10002),
        ("P5", 10002),
        ("P6", 10002),
        ("P1", 99999),
    ]
}

fn epoch_days(date: (i32, u32, u32)) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
    (date - epoch).num_days() as i32
}

fn write_parquet(path: &Path, batch: RecordBatch) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// Transactions and properties as Parquet, ids stored as padded raw bytes.
fn write_parquet_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let sales = sales();
    let transaction_schema = Arc::new(Schema::new(vec![
        Field::new("gnaf_pid", DataType::Binary, false),
        Field::new("price", DataType::Float64, true),
        Field::new("date_sold", DataType::Date32, true),
    ]));
    let transactions = RecordBatch::try_new(
        transaction_schema,
        vec![
            Arc::new(BinaryArray::from_iter_values(
                sales.iter().map(|(pid, _, _)| pid.as_bytes()),
            )) as ArrayRef,
            Arc::new(Float64Array::from(
                sales.iter().map(|(_, price, _)| *price).collect::<Vec<_>>(),
            )),
            Arc::new(Date32Array::from(
                sales
                    .iter()
                    .map(|(_, _, date)| date.map(epoch_days))
                    .collect::<Vec<_>>(),
            )),
        ],
    )
    .unwrap();

    let properties = properties();
    let property_schema = Arc::new(Schema::new(vec![
        Field::new("gnaf_pid", DataType::Binary, false),
        Field::new("mb_2016_code", DataType::Int64, false),
    ]));
    let properties = RecordBatch::try_new(
        property_schema,
        vec![
            Arc::new(BinaryArray::from_iter_values(
                properties.iter().map(|(pid, _)| pid.as_bytes()),
            )) as ArrayRef,
            Arc::new(Int64Array::from(
                properties.iter().map(|(_, code)| *code).collect::<Vec<_>>(),
            )),
        ],
    )
    .unwrap();

    let transactions_path = dir.join("transactions.parquet");
    let properties_path = dir.join("gnaf_prop.parquet");
    write_parquet(&transactions_path, transactions);
    write_parquet(&properties_path, properties);
    (transactions_path, properties_path)
}

fn write_csv_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let mut transactions = String::from("gnaf_pid,price,date_sold\n");
    for (pid, price, date) in sales() {
        let price = price.map(|p| p.to_string()).unwrap_or_default();
        let date = date
            .map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d))
            .unwrap_or_default();
        transactions.push_str(&format!("{},{},{}\n", pid, price, date));
    }

    let mut properties_csv = String::from("gnaf_pid,mb_2016_code\n");
    for (pid, code) in properties() {
        properties_csv.push_str(&format!("{},{}\n", pid, code));
    }

    let transactions_path = dir.join("transactions.csv");
    let properties_path = dir.join("gnaf_prop.csv");
    std::fs::write(&transactions_path, transactions).unwrap();
    std::fs::write(&properties_path, properties_csv).unwrap();
    (transactions_path, properties_path)
}

async fn run_pipeline(
    transactions: &Path,
    properties: &Path,
    config: AnalysisConfig,
) -> mesh_growth::Result<mesh_growth::processors::PipelineOutput> {
    let inputs = InputLoader::new(config.identifier_columns())
        .load(transactions, properties)
        .await?;
    GrowthPipeline::new(config).run(&inputs.transactions, &inputs.properties, None)
}

async fn run_cli(args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["mesh-growth"];
    argv.extend_from_slice(args);
    run(Cli::try_parse_from(argv)?).await
}

#[tokio::test]
async fn test_end_to_end_parquet_inputs() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (transactions, properties) = write_parquet_inputs(temp_dir.path());

    let output = run_pipeline(&transactions, &properties, AnalysisConfig::default())
        .await
        .unwrap();

    let csv = CsvMetricsWriter::new()
        .metrics_to_string(&output.metrics)
        .unwrap();
    assert_eq!(csv, EXPECTED_METRICS_CSV);

    let report = &output.report;
    assert_eq!(report.transaction_rows, 21);
    assert_eq!(report.property_rows, 7);
    assert_eq!(report.joined_rows, 20);
    assert_eq!(report.unmatched_rows(), 1);
    assert_eq!(report.dropped.invalid_price, 1);
    assert_eq!(report.dropped.invalid_date, 1);
    assert_eq!(report.dropped.below_min_price, 1);
    assert_eq!(report.clean_rows, 17);
    assert_eq!(report.groups_total, 6);
    assert_eq!(report.low_volume_removed, 1);
    assert_eq!(report.metric_rows, 5);
    assert_eq!(report.mesh_blocks, 2);
}

#[tokio::test]
async fn test_csv_inputs_match_parquet_inputs() {
    let temp_dir = TempDir::new().unwrap();
    let (transactions, properties) = write_csv_inputs(temp_dir.path());

    let output = run_pipeline(&transactions, &properties, AnalysisConfig::default())
        .await
        .unwrap();
    let csv = CsvMetricsWriter::new()
        .metrics_to_string(&output.metrics)
        .unwrap();
    assert_eq!(csv, EXPECTED_METRICS_CSV);
}

#[tokio::test]
async fn test_analyze_command_writes_all_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let (transactions, properties) = write_parquet_inputs(temp_dir.path());
    let output_dir = temp_dir.path().join("out");

    run_cli(&[
        "analyze",
        "-t",
        transactions.to_str().unwrap(),
        "-p",
        properties.to_str().unwrap(),
        "-o",
        output_dir.to_str().unwrap(),
    ])
    .await
    .unwrap();

    let metrics =
        std::fs::read_to_string(output_dir.join("median_price_growth_by_mesh_block.csv")).unwrap();
    assert_eq!(metrics, EXPECTED_METRICS_CSV);

    let ranking = std::fs::read_to_string(output_dir.join("top_growth_areas.csv")).unwrap();
    assert_eq!(
        ranking,
        "mesh_block_code,average_growth_yoy\n10002,10.00\n10001,12.50\n"
    );

    let history = std::fs::read_to_string(output_dir.join("top_price_history.csv")).unwrap();
    assert_eq!(
        history,
        "year,10001,10002\n2018,200000,\n2019,230000,500000\n2020,253000,550000\n"
    );
}

#[tokio::test]
async fn test_csv_output_is_byte_identical_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let (transactions, properties) = write_parquet_inputs(temp_dir.path());

    let mut outputs = Vec::new();
    for run_dir in ["first", "second"] {
        let output_dir = temp_dir.path().join(run_dir);
        run_cli(&[
            "analyze",
            "-t",
            transactions.to_str().unwrap(),
            "-p",
            properties.to_str().unwrap(),
            "-o",
            output_dir.to_str().unwrap(),
            "--skip-chart-data",
        ])
        .await
        .unwrap();

        outputs.push(std::fs::read(output_dir.join("median_price_growth_by_mesh_block.csv")).unwrap());
        assert!(!output_dir.join("top_growth_areas.csv").exists());
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn test_parquet_metrics_feed_rank_command() {
    let temp_dir = TempDir::new().unwrap();
    let (transactions, properties) = write_parquet_inputs(temp_dir.path());
    let output_dir = temp_dir.path().join("out");

    run_cli(&[
        "analyze",
        "-t",
        transactions.to_str().unwrap(),
        "-p",
        properties.to_str().unwrap(),
        "-o",
        output_dir.to_str().unwrap(),
        "--format",
        "parquet",
        "--compression",
        "zstd",
        "--skip-chart-data",
    ])
    .await
    .unwrap();

    let metrics_path = output_dir.join("median_price_growth_by_mesh_block.parquet");
    let metrics = read_metrics(&metrics_path).unwrap();
    let csv = CsvMetricsWriter::new().metrics_to_string(&metrics).unwrap();
    assert_eq!(csv, EXPECTED_METRICS_CSV);

    let chart_dir = temp_dir.path().join("charts");
    run_cli(&[
        "rank",
        "-m",
        metrics_path.to_str().unwrap(),
        "-o",
        chart_dir.to_str().unwrap(),
        "--top-k",
        "1",
        "--history-k",
        "1",
    ])
    .await
    .unwrap();

    let ranking = std::fs::read_to_string(chart_dir.join("top_growth_areas.csv")).unwrap();
    assert_eq!(ranking, "mesh_block_code,average_growth_yoy\n10001,12.50\n");
    let history = std::fs::read_to_string(chart_dir.join("top_price_history.csv")).unwrap();
    assert_eq!(history, "year,10001\n2018,200000\n2019,230000\n2020,253000\n");
}

#[tokio::test]
async fn test_missing_input_leaves_no_output() {
    let temp_dir = TempDir::new().unwrap();
    let (_, properties) = write_parquet_inputs(temp_dir.path());
    let output_dir = temp_dir.path().join("out");
    let missing = temp_dir.path().join("missing.parquet");

    let err = run_cli(&[
        "analyze",
        "-t",
        missing.to_str().unwrap(),
        "-p",
        properties.to_str().unwrap(),
        "-o",
        output_dir.to_str().unwrap(),
    ])
    .await
    .unwrap_err();

    let processing = err.downcast_ref::<ProcessingError>().unwrap();
    assert!(matches!(processing, ProcessingError::InputNotFound { .. }));
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_missing_mesh_block_column_is_configuration_error() {
    let temp_dir = TempDir::new().unwrap();
    let (transactions, properties) = write_parquet_inputs(temp_dir.path());

    let config = AnalysisConfig::default()
        .with_overrides(&ConfigOverrides {
            mesh_block: Some("mb_2021_code".to_string()),
            ..Default::default()
        })
        .unwrap();

    let err = run_pipeline(&transactions, &properties, config)
        .await
        .unwrap_err();
    match err {
        ProcessingError::Configuration { table, column } => {
            assert_eq!(table, "property");
            assert_eq!(column, "mb_2021_code");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_clean_stage_failure_names_stage() {
    let temp_dir = TempDir::new().unwrap();
    let (transactions, properties) = write_parquet_inputs(temp_dir.path());

    let config = AnalysisConfig::default()
        .with_overrides(&ConfigOverrides {
            min_price: Some(1_000_000.0),
            ..Default::default()
        })
        .unwrap();

    let err = run_pipeline(&transactions, &properties, config)
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some(PipelineStage::Clean));
}

#[tokio::test]
async fn test_inspect_reports_binary_ids_as_text() {
    let temp_dir = TempDir::new().unwrap();
    let (_, properties) = write_parquet_inputs(temp_dir.path());

    run_cli(&["inspect", "-f", properties.to_str().unwrap(), "-s", "3"])
        .await
        .unwrap();
}
