//! Scalability analysis: best runs, speedup and race-condition losses

#[cfg(test)]
mod comprehensive_tests;

use crate::{
    data::Dataset,
    models::BenchmarkRecord,
    types::TestType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Best value of a metric and the worker count that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestResult {
    pub value: f64,
    pub workers: u32,
}

/// Speedup of one run relative to the single-worker baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedupPoint {
    pub workers: u32,
    pub speedup: f64,
}

/// Summary of the synchronised runs of one concurrency kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub test_type: TestType,
    /// Number of rows in the subset
    pub runs: usize,
    /// Minimum execution time (ms)
    pub best_time: Option<BestResult>,
    /// Maximum throughput (ops/ms)
    pub best_throughput: Option<BestResult>,
}

impl TypeSummary {
    /// Summarize a subset of rows
    pub fn from_rows(test_type: TestType, rows: &[&BenchmarkRecord]) -> Self {
        Self {
            test_type,
            runs: rows.len(),
            best_time: best_time(rows),
            best_throughput: best_throughput(rows),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs == 0
    }
}

/// Lost-update statistics over the unsynchronised runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceConditionSummary {
    pub total_runs: usize,
    pub incorrect_runs: usize,
    /// Mean loss over incorrect rows with a non-zero expected counter
    pub average_loss_percent: Option<f64>,
}

/// Everything the console summary prints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalabilitySummary {
    pub threads: TypeSummary,
    pub processes: TypeSummary,
    /// Present only when unsynchronised rows exist
    pub race_conditions: Option<RaceConditionSummary>,
    pub generated_at: DateTime<Utc>,
}

/// Row with the minimum execution time; ties resolve to the first row
pub fn best_time(rows: &[&BenchmarkRecord]) -> Option<BestResult> {
    select_best(rows, |r| r.execution_time_ms, |candidate, best| candidate < best)
}

/// Row with the maximum throughput; ties resolve to the first row
pub fn best_throughput(rows: &[&BenchmarkRecord]) -> Option<BestResult> {
    select_best(rows, |r| r.throughput_ops_ms, |candidate, best| candidate > best)
}

fn select_best<M, B>(rows: &[&BenchmarkRecord], metric: M, better: B) -> Option<BestResult>
where
    M: Fn(&BenchmarkRecord) -> f64,
    B: Fn(f64, f64) -> bool,
{
    let mut best: Option<BestResult> = None;

    for row in rows {
        let value = metric(row);
        if value.is_nan() {
            continue;
        }
        match best {
            Some(current) if !better(value, current.value) => {}
            _ => {
                best = Some(BestResult {
                    value,
                    workers: row.num_threads,
                })
            }
        }
    }

    best
}

/// Execution time of the first single-worker row
pub fn speedup_baseline(rows: &[&BenchmarkRecord]) -> Option<f64> {
    rows.iter()
        .find(|r| r.num_threads == 1)
        .map(|r| r.execution_time_ms)
        .filter(|&t| t > 0.0 && t.is_finite())
}

/// Speedup per row in subset order.
///
/// `None` when the subset has no usable single-worker baseline. Rows with a
/// non-positive execution time are skipped.
pub fn speedup_series(rows: &[&BenchmarkRecord]) -> Option<Vec<SpeedupPoint>> {
    let baseline = speedup_baseline(rows)?;

    Some(
        rows.iter()
            .filter(|r| r.execution_time_ms > 0.0)
            .map(|r| SpeedupPoint {
                workers: r.num_threads,
                speedup: baseline / r.execution_time_ms,
            })
            .collect(),
    )
}

/// Lost-update statistics over a set of unsynchronised rows
pub fn race_condition_summary(rows: &[&BenchmarkRecord]) -> RaceConditionSummary {
    let incorrect: Vec<&&BenchmarkRecord> = rows.iter().filter(|r| !r.is_correct).collect();
    let losses: Vec<f64> = incorrect.iter().filter_map(|r| r.data_loss_percent()).collect();

    let average_loss_percent = if losses.is_empty() {
        None
    } else {
        Some(losses.iter().sum::<f64>() / losses.len() as f64)
    };

    RaceConditionSummary {
        total_runs: rows.len(),
        incorrect_runs: incorrect.len(),
        average_loss_percent,
    }
}

/// Rows ordered by worker count; equal counts keep file order
pub fn order_by_workers<'a>(rows: &[&'a BenchmarkRecord]) -> Vec<&'a BenchmarkRecord> {
    let mut ordered = rows.to_vec();
    ordered.sort_by_key(|r| r.num_threads);
    ordered
}

/// Analysis entry point over a loaded dataset
pub struct ScalabilityAnalyzer<'a> {
    dataset: &'a Dataset,
}

impl<'a> ScalabilityAnalyzer<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Synchronised rows of one kind
    pub fn subset(&self, test_type: &TestType) -> Vec<&'a BenchmarkRecord> {
        self.dataset.synchronized(test_type)
    }

    /// Speedup series of the synchronised rows of one kind
    pub fn speedup(&self, test_type: &TestType) -> Option<Vec<SpeedupPoint>> {
        speedup_series(&self.subset(test_type))
    }

    /// Compute the full console summary
    pub fn summarize(&self) -> ScalabilitySummary {
        let threads = self.subset(&TestType::Threads);
        let processes = self.subset(&TestType::Processes);
        let racy = self.dataset.unsynchronized();

        ScalabilitySummary {
            threads: TypeSummary::from_rows(TestType::Threads, &threads),
            processes: TypeSummary::from_rows(TestType::Processes, &processes),
            race_conditions: if racy.is_empty() {
                None
            } else {
                Some(race_condition_summary(&racy))
            },
            generated_at: Utc::now(),
        }
    }

    /// Export the summary as JSON
    pub fn export_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(&self.summarize())?)
    }
}
