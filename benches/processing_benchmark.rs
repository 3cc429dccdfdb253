use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mesh_growth::analyzers::GrowthRanking;
use mesh_growth::config::AnalysisConfig;
use mesh_growth::models::{CellValue, SaleRecord, Table};
use mesh_growth::processors::{GrowthAggregator, GrowthPipeline, RecordJoiner};

// Synthetic sales: `mesh_blocks` blocks, each with a few properties selling
// several times a year over ten years.
fn create_sales(mesh_blocks: usize, sales_per_year: usize) -> Vec<SaleRecord> {
    let mut sales = Vec::with_capacity(mesh_blocks * sales_per_year * 10);

    for block in 0..mesh_blocks {
        for year in 2012..2022 {
            for sale in 0..sales_per_year {
                let date = NaiveDate::from_ymd_opt(year, (sale % 12) as u32 + 1, 1).unwrap();
                let price = 300_000.0
                    + (block as f64) * 1_000.0
                    + ((year - 2012) as f64) * 12_500.0
                    + (sale as f64) * 750.0;
                sales.push(SaleRecord::new(
                    format!("GANSW{}", block * 100 + sale % 7),
                    format!("{}", 10_000_000 + block),
                    price,
                    date,
                ));
            }
        }
    }

    sales
}

fn create_tables(mesh_blocks: usize, sales_per_year: usize) -> (Table, Table) {
    let sales = create_sales(mesh_blocks, sales_per_year);

    let mut transactions = Table::new(
        "transaction",
        vec![
            "gnaf_pid".to_string(),
            "price".to_string(),
            "date_sold".to_string(),
        ],
    );
    let mut properties = Table::new(
        "property",
        vec!["gnaf_pid".to_string(), "mb_2016_code".to_string()],
    );

    for sale in &sales {
        transactions
            .push_row(vec![
                CellValue::Text(sale.property_id.clone()),
                CellValue::Float(sale.price),
                CellValue::Date(sale.sale_date),
            ])
            .unwrap();
    }
    for block in 0..mesh_blocks {
        for property in 0..7 {
            properties
                .push_row(vec![
                    CellValue::Text(format!("GANSW{}", block * 100 + property)),
                    CellValue::Int(10_000_000 + block as i64),
                ])
                .unwrap();
        }
    }

    (transactions, properties)
}

fn benchmark_growth_aggregator(c: &mut Criterion) {
    let sales = create_sales(200, 12);

    c.bench_function("growth_aggregator", |b| {
        b.iter(|| {
            let aggregator = GrowthAggregator::new(3);
            let output = aggregator.aggregate(black_box(&sales));
            black_box(output.metrics.len())
        })
    });
}

fn benchmark_record_join(c: &mut Criterion) {
    let (transactions, properties) = create_tables(200, 12);

    c.bench_function("record_join", |b| {
        b.iter(|| {
            let joiner = RecordJoiner::new("gnaf_pid", "gnaf_pid", "mb_2016_code");
            let joined = joiner.join(&transactions, &properties).unwrap();
            black_box(joined.len())
        })
    });
}

fn benchmark_growth_ranking(c: &mut Criterion) {
    let metrics = GrowthAggregator::new(3)
        .aggregate(&create_sales(500, 6))
        .metrics;

    c.bench_function("growth_ranking", |b| {
        b.iter(|| {
            let ranking = GrowthRanking::default().rank_top(black_box(&metrics));
            black_box(ranking.ranked.len())
        })
    });
}

fn benchmark_varying_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_by_size");

    for &size in &[10, 50, 100, 500] {
        group.bench_with_input(
            BenchmarkId::new("mesh_blocks", size),
            &size,
            |b, &mesh_blocks| {
                let (transactions, properties) = create_tables(mesh_blocks, 8);
                let pipeline = GrowthPipeline::new(AnalysisConfig::default());

                b.iter(|| {
                    let output = pipeline.run(&transactions, &properties, None).unwrap();
                    black_box(output.metrics.len())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_growth_aggregator,
    benchmark_record_join,
    benchmark_growth_ranking,
    benchmark_varying_data_sizes
);
criterion_main!(benches);
