//! Performance benchmarks for the scalability analyzer
//!
//! These benchmarks measure CSV loading, summary computation and chart
//! series construction on synthetic datasets of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scalability_analyzer::{
    charts::analysis_panels,
    Dataset, ScalabilityAnalyzer,
};

const HEADER: &str = "test_type,sync_type,num_threads,execution_time_ms,throughput_ops_ms,cpu_utilization_percent,expected_counter,final_counter,is_correct";

/// Create a CSV with `workers` rows per (type, sync) combination
fn create_sample_csv(workers: u32) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');

    for n in 1..=workers {
        for test_type in ["PROCESOS", "HILOS"] {
            for sync_type in ["CON_SYNC", "SIN_SYNC"] {
                let expected = u64::from(n) * 1_000_000;
                let time = 100.0 + 900.0 / f64::from(n);
                let lost = if sync_type == "SIN_SYNC" && n > 1 { expected / 5 } else { 0 };
                csv.push_str(&format!(
                    "{},{},{},{:.3},{:.3},{:.1},{},{},{}\n",
                    test_type,
                    sync_type,
                    n,
                    time,
                    expected as f64 / time,
                    95.0 * f64::from(n),
                    expected,
                    expected - lost,
                    if lost == 0 { "True" } else { "False" }
                ));
            }
        }
    }

    csv
}

fn bench_csv_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_loading");

    for workers in [8u32, 64, 512] {
        let csv = create_sample_csv(workers);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &csv, |b, csv| {
            b.iter(|| Dataset::from_reader(black_box(csv.as_bytes())))
        });
    }

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");

    for workers in [8u32, 64, 512] {
        let dataset = match Dataset::from_reader(create_sample_csv(workers).as_bytes()) {
            Ok(dataset) => dataset,
            Err(e) => panic!("sample data must load: {}", e),
        };

        group.bench_with_input(BenchmarkId::new("summarize", workers), &dataset, |b, dataset| {
            b.iter(|| ScalabilityAnalyzer::new(black_box(dataset)).summarize())
        });

        group.bench_with_input(BenchmarkId::new("analysis_panels", workers), &dataset, |b, dataset| {
            b.iter(|| analysis_panels(black_box(dataset)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_csv_loading, bench_summary);
criterion_main!(benches);
