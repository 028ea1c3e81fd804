//! Property-based tests for the scalability analysis functions

use super::*;
use crate::types::SyncMode;
use proptest::collection::vec;
use proptest::prelude::*;

/// Property-based test generators
mod generators {
    use super::*;

    /// Generate a synchronised thread row with a positive execution time
    pub fn sync_row() -> impl Strategy<Value = BenchmarkRecord> {
        (1u32..64, 0.01f64..100_000.0, 1u64..10_000_000).prop_map(|(workers, time, increments)| {
            let expected = increments * u64::from(workers);
            BenchmarkRecord::from_measurement(
                TestType::Threads,
                SyncMode::Synchronized,
                workers,
                time,
                100.0,
                expected,
                expected,
            )
        })
    }

    /// Generate an unsynchronised row whose final counter never exceeds the expected one
    pub fn racy_row() -> impl Strategy<Value = BenchmarkRecord> {
        (1u32..64, 1u64..10_000_000, 0.0f64..=1.0).prop_map(|(workers, expected, kept)| {
            let final_counter = (expected as f64 * kept) as u64;
            BenchmarkRecord::from_measurement(
                TestType::Processes,
                SyncMode::Unsynchronized,
                workers,
                10.0,
                100.0,
                expected,
                final_counter.min(expected),
            )
        })
    }
}

proptest! {
    /// Best time is the minimum and belongs to the first row carrying it
    #[test]
    fn best_time_is_first_minimum(rows in vec(generators::sync_row(), 1..50)) {
        let refs: Vec<&BenchmarkRecord> = rows.iter().collect();
        let best = best_time(&refs).unwrap();

        let min = rows.iter().map(|r| r.execution_time_ms).fold(f64::INFINITY, f64::min);
        prop_assert_eq!(best.value, min);

        let first = rows.iter().find(|r| r.execution_time_ms == min).unwrap();
        prop_assert_eq!(best.workers, first.num_threads);
    }

    /// Best throughput is never below any row's throughput
    #[test]
    fn best_throughput_dominates(rows in vec(generators::sync_row(), 1..50)) {
        let refs: Vec<&BenchmarkRecord> = rows.iter().collect();
        let best = best_throughput(&refs).unwrap();
        prop_assert!(rows.iter().all(|r| r.throughput_ops_ms <= best.value));
    }

    /// Speedup exists exactly when a single-worker row exists, and is 1.0 at that row
    #[test]
    fn speedup_baseline_is_one(rows in vec(generators::sync_row(), 1..50)) {
        let refs: Vec<&BenchmarkRecord> = rows.iter().collect();
        let has_baseline = rows.iter().any(|r| r.num_threads == 1);

        match speedup_series(&refs) {
            Some(series) => {
                prop_assert!(has_baseline);
                prop_assert_eq!(series.len(), rows.len());
                let index = rows.iter().position(|r| r.num_threads == 1).unwrap();
                prop_assert_eq!(series[index].speedup, 1.0);
                prop_assert!(series.iter().all(|p| p.speedup > 0.0));
            }
            None => prop_assert!(!has_baseline),
        }
    }

    /// Average loss stays within 0..=100 and counts only incorrect rows
    #[test]
    fn race_loss_is_a_percentage(rows in vec(generators::racy_row(), 1..50)) {
        let refs: Vec<&BenchmarkRecord> = rows.iter().collect();
        let summary = race_condition_summary(&refs);

        prop_assert_eq!(summary.total_runs, rows.len());
        prop_assert_eq!(summary.incorrect_runs, rows.iter().filter(|r| !r.is_correct).count());

        match summary.average_loss_percent {
            Some(loss) => {
                prop_assert!(summary.incorrect_runs > 0);
                prop_assert!(loss > 0.0 && loss <= 100.0);
            }
            None => prop_assert_eq!(summary.incorrect_runs, 0),
        }
    }

    /// Ordering by workers is sorted and keeps every row
    #[test]
    fn order_by_workers_sorts(rows in vec(generators::sync_row(), 0..50)) {
        let refs: Vec<&BenchmarkRecord> = rows.iter().collect();
        let ordered = order_by_workers(&refs);
        prop_assert_eq!(ordered.len(), rows.len());
        prop_assert!(ordered.windows(2).all(|w| w[0].num_threads <= w[1].num_threads));
    }
}

/// Edge cases around degenerate input
mod edge_case_tests {
    use super::*;

    #[test]
    fn zero_baseline_has_no_speedup() {
        let rows = vec![BenchmarkRecord::from_measurement(
            TestType::Threads,
            SyncMode::Synchronized,
            1,
            0.0,
            0.0,
            10,
            10,
        )];
        let refs: Vec<&BenchmarkRecord> = rows.iter().collect();
        assert!(speedup_series(&refs).is_none());
    }

    #[test]
    fn nan_times_are_ignored_for_best() {
        let mut rows = vec![
            BenchmarkRecord::from_measurement(TestType::Threads, SyncMode::Synchronized, 1, 10.0, 0.0, 10, 10),
            BenchmarkRecord::from_measurement(TestType::Threads, SyncMode::Synchronized, 2, 20.0, 0.0, 10, 10),
        ];
        rows[0].execution_time_ms = f64::NAN;
        let refs: Vec<&BenchmarkRecord> = rows.iter().collect();
        assert_eq!(best_time(&refs), Some(BestResult { value: 20.0, workers: 2 }));
    }

    #[test]
    fn empty_dataset_summary() {
        let dataset = Dataset::default();
        let summary = ScalabilityAnalyzer::new(&dataset).summarize();
        assert!(summary.threads.is_empty());
        assert!(summary.processes.is_empty());
        assert!(summary.race_conditions.is_none());
    }
}
