//! Process-based counter benchmark
//!
//! The parent maps a shared counter, re-executes its own binary once per
//! worker through the hidden `worker` command and waits for every child.

use super::cpu::{utilization_percent, CpuScope, CpuTimer};
use super::shared::SharedCounter;
use super::{RunMeasurement, Workload};
use crate::cli::WorkerArgs;
use crate::error::{AppError, Result};
use crate::logging::BenchLogger;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Instant;

/// Worker processes sharing a mapped counter
pub struct ProcessWorkload {
    executable: PathBuf,
    show_worker_output: bool,
    logger: Option<BenchLogger>,
}

impl ProcessWorkload {
    /// Workers are spawned from the given executable
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            show_worker_output: false,
            logger: None,
        }
    }

    /// Workers are spawned from the running binary
    pub fn current_exe() -> Result<Self> {
        let executable = std::env::current_exe()
            .map_err(|e| AppError::benchmark(format!("Cannot locate own executable: {}", e)))?;
        Ok(Self::new(executable))
    }

    /// Let worker stdout/stderr through to the terminal
    pub fn show_worker_output(mut self, show: bool) -> Self {
        self.show_worker_output = show;
        self
    }

    /// Log worker spawn and exit events
    pub fn with_logger(mut self, logger: BenchLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    fn spawn_worker(&self, counter: &SharedCounter, id: u32, increments: u64, synchronized: bool) -> Result<Child> {
        let mut command = Command::new(&self.executable);
        command
            .arg("worker")
            .arg("--shm")
            .arg(counter.path())
            .arg("--id")
            .arg(id.to_string())
            .arg("--increments")
            .arg(increments.to_string())
            .stdin(Stdio::null());

        if synchronized {
            command.arg("--sync");
        }

        if !self.show_worker_output {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = command
            .spawn()
            .map_err(|e| AppError::benchmark(format!("Failed to spawn worker {}: {}", id, e)))?;

        if let Some(logger) = &self.logger {
            logger.log_worker(id, child.id(), "spawned");
        }

        Ok(child)
    }

    /// Wait for every child, even after a failure, so none is left behind
    fn wait_all(&self, children: Vec<(u32, Child)>) -> Result<()> {
        let mut failures = Vec::new();

        for (id, mut child) in children {
            let pid = child.id();
            match child.wait() {
                Ok(status) if status.success() => {
                    if let Some(logger) = &self.logger {
                        logger.log_worker(id, pid, "exited");
                    }
                }
                Ok(status) => failures.push(format!("worker {} exited with {}", id, status)),
                Err(e) => failures.push(format!("worker {} could not be waited for: {}", id, e)),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::benchmark(failures.join("; ")))
        }
    }
}

impl Workload for ProcessWorkload {
    fn run(&self, workers: u32, increments: u64, synchronized: bool) -> Result<RunMeasurement> {
        let counter = SharedCounter::create()?;

        let cpu = CpuTimer::start(CpuScope::Children)?;
        let start = Instant::now();

        let mut children = Vec::with_capacity(workers as usize);
        for id in 0..workers {
            match self.spawn_worker(&counter, id, increments, synchronized) {
                Ok(child) => children.push((id, child)),
                Err(e) => {
                    // Reap the workers already running before reporting
                    let _ = self.wait_all(children);
                    return Err(e);
                }
            }
        }
        self.wait_all(children)?;

        let wall_ms = start.elapsed().as_secs_f64() * 1000.0;
        let cpu_seconds = cpu.elapsed()?;

        Ok(RunMeasurement {
            wall_ms,
            cpu_percent: utilization_percent(cpu_seconds, wall_ms),
            final_counter: counter.value(),
        })
    }
}

/// Body of a worker process: attach to the mapping and increment
pub fn run_worker(args: &WorkerArgs) -> Result<()> {
    let counter = SharedCounter::open(&args.shm)?;

    if args.sync {
        for _ in 0..args.increments {
            counter.increment_locked();
        }
    } else {
        for _ in 0..args.increments {
            counter.increment_racy();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_worker_increments_shared_counter() {
        let counter = SharedCounter::create().unwrap();
        let args = WorkerArgs {
            shm: counter.path().to_path_buf(),
            id: 0,
            increments: 500,
            sync: true,
        };
        run_worker(&args).unwrap();
        run_worker(&WorkerArgs { sync: false, ..args }).unwrap();
        assert_eq!(counter.value(), 1000);
    }

    #[test]
    fn test_run_worker_without_mapping_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = WorkerArgs {
            shm: dir.path().join("gone"),
            id: 3,
            increments: 1,
            sync: false,
        };
        assert!(matches!(run_worker(&args), Err(AppError::Benchmark(_))));
    }

    #[test]
    fn test_missing_executable_is_benchmark_error() {
        let workload = ProcessWorkload::new(PathBuf::from("/nonexistent/scalab-worker"));
        let result = workload.run(2, 10, true);
        assert!(matches!(result, Err(AppError::Benchmark(_))));
    }
}
