//! Counter increment benchmark: processes vs threads, with and without locking
//!
//! Every selected combination of concurrency kind, synchronisation mode and
//! worker count runs `iterations` times; the runs are folded into one
//! `BenchmarkRecord` and all records are written as CSV for the report.

pub mod cpu;
pub mod processes;
pub mod shared;
pub mod threads;

pub use processes::{run_worker, ProcessWorkload};
pub use threads::ThreadWorkload;

use crate::{
    error::{AppError, Result},
    logging::BenchLogger,
    models::{BenchConfig, BenchmarkRecord},
    types::{SyncMode, TestType},
};
use std::path::Path;

/// Raw result of one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunMeasurement {
    pub wall_ms: f64,
    pub cpu_percent: f64,
    pub final_counter: u64,
}

/// A way of running N workers that each increment a shared counter
pub trait Workload {
    fn run(&self, workers: u32, increments: u64, synchronized: bool) -> Result<RunMeasurement>;
}

/// Fold the iterations of one combination into a CSV row.
///
/// Time and CPU are averaged, the counter is the worst observed and the row
/// is correct only if every iteration was.
pub fn aggregate(
    test_type: TestType,
    sync_type: SyncMode,
    workers: u32,
    expected_counter: u64,
    runs: &[RunMeasurement],
) -> Result<BenchmarkRecord> {
    if runs.is_empty() {
        return Err(AppError::internal("Cannot aggregate zero benchmark runs"));
    }

    let count = runs.len() as f64;
    let mean_ms = runs.iter().map(|r| r.wall_ms).sum::<f64>() / count;
    let mean_cpu = runs.iter().map(|r| r.cpu_percent).sum::<f64>() / count;
    let worst = runs.iter().map(|r| r.final_counter).min().unwrap_or(0);
    let all_correct = runs.iter().all(|r| r.final_counter == expected_counter);

    let mut record = BenchmarkRecord::from_measurement(
        test_type,
        sync_type,
        workers,
        mean_ms,
        mean_cpu,
        expected_counter,
        worst,
    );
    record.is_correct = all_correct;
    Ok(record)
}

/// Write records with a header row, creating parent directories
pub fn write_csv(path: &Path, records: &[BenchmarkRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Drives the benchmark sweep described by a `BenchConfig`
pub struct BenchmarkRunner<'a> {
    config: &'a BenchConfig,
    logger: BenchLogger,
    threads: Box<dyn Workload + 'a>,
    processes: Option<Box<dyn Workload + 'a>>,
}

impl<'a> BenchmarkRunner<'a> {
    /// Runner with the thread workload and, if processes are selected,
    /// workers spawned from the running binary
    pub fn new(config: &'a BenchConfig) -> Result<Self> {
        let processes: Option<Box<dyn Workload + 'a>> = if config.test_types.contains(&TestType::Processes) {
            Some(Box::new(
                ProcessWorkload::current_exe()?
                    .show_worker_output(config.debug)
                    .with_logger(BenchLogger::new(config)),
            ))
        } else {
            None
        };

        Ok(Self {
            config,
            logger: BenchLogger::new(config),
            threads: Box::new(ThreadWorkload),
            processes,
        })
    }

    /// Runner with explicit workloads
    pub fn with_workloads(
        config: &'a BenchConfig,
        threads: Box<dyn Workload + 'a>,
        processes: Option<Box<dyn Workload + 'a>>,
    ) -> Self {
        Self {
            config,
            logger: BenchLogger::new(config),
            threads,
            processes,
        }
    }

    fn workload(&self, test_type: &TestType) -> Result<&dyn Workload> {
        match test_type {
            TestType::Threads => Ok(self.threads.as_ref()),
            TestType::Processes => self
                .processes
                .as_deref()
                .ok_or_else(|| AppError::internal("Process workload not configured")),
            TestType::Other(tag) => Err(AppError::validation(format!("Unknown test type: {}", tag))),
        }
    }

    /// Run one combination `iterations` times and aggregate
    pub fn run_combination(&self, test_type: &TestType, sync_type: &SyncMode, workers: u32) -> Result<BenchmarkRecord> {
        let workload = self.workload(test_type)?;
        let expected = u64::from(workers)
            .checked_mul(self.config.increments_per_worker)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "{} workers x {} increments overflows the shared counter",
                    workers, self.config.increments_per_worker
                ))
            })?;
        let mut runs = Vec::with_capacity(self.config.iterations as usize);

        for iteration in 1..=self.config.iterations {
            self.logger.log_run_start(test_type.tag(), sync_type.tag(), workers, iteration);
            runs.push(workload.run(workers, self.config.increments_per_worker, sync_type.is_synchronized())?);
        }

        let record = aggregate(test_type.clone(), sync_type.clone(), workers, expected, &runs)?;
        self.logger.log_record(&record);
        Ok(record)
    }

    /// Run every selected combination in sweep order, reporting each row
    pub fn run<F>(&self, mut on_record: F) -> Result<Vec<BenchmarkRecord>>
    where
        F: FnMut(&BenchmarkRecord),
    {
        let mut records = Vec::with_capacity(self.config.total_runs());

        for &workers in &self.config.worker_counts {
            for test_type in &self.config.test_types {
                for sync_type in &self.config.sync_modes {
                    let record = self.run_combination(test_type, sync_type, workers)?;
                    on_record(&record);
                    records.push(record);
                }
            }
        }

        Ok(records)
    }
}
