//! Thread-based counter benchmark

use super::cpu::{utilization_percent, CpuScope, CpuTimer};
use super::{RunMeasurement, Workload};
use crate::error::{AppError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Worker threads inside this process incrementing one counter
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadWorkload;

impl ThreadWorkload {
    fn run_locked(workers: u32, increments: u64) -> Result<u64> {
        let counter = Mutex::new(0u64);

        let panicked = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        for _ in 0..increments {
                            // A poisoned lock still holds a valid count
                            let mut guard = counter.lock().unwrap_or_else(|e| e.into_inner());
                            *guard += 1;
                        }
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).filter(|r| r.is_err()).count()
        });

        if panicked > 0 {
            return Err(AppError::benchmark(format!("{} worker threads panicked", panicked)));
        }

        let value = counter.into_inner().unwrap_or_else(|e| e.into_inner());
        Ok(value)
    }

    fn run_racy(workers: u32, increments: u64) -> Result<u64> {
        let counter = AtomicU64::new(0);

        let panicked = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        for _ in 0..increments {
                            // Separate load and store: concurrent updates get lost
                            let value = counter.load(Ordering::Relaxed);
                            counter.store(value + 1, Ordering::Relaxed);
                        }
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).filter(|r| r.is_err()).count()
        });

        if panicked > 0 {
            return Err(AppError::benchmark(format!("{} worker threads panicked", panicked)));
        }

        Ok(counter.load(Ordering::SeqCst))
    }
}

impl Workload for ThreadWorkload {
    fn run(&self, workers: u32, increments: u64, synchronized: bool) -> Result<RunMeasurement> {
        let cpu = CpuTimer::start(CpuScope::Process)?;
        let start = Instant::now();

        let final_counter = if synchronized {
            Self::run_locked(workers, increments)?
        } else {
            Self::run_racy(workers, increments)?
        };

        let wall_ms = start.elapsed().as_secs_f64() * 1000.0;
        let cpu_seconds = cpu.elapsed()?;

        Ok(RunMeasurement {
            wall_ms,
            cpu_percent: utilization_percent(cpu_seconds, wall_ms),
            final_counter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_run_is_exact() {
        let run = ThreadWorkload.run(4, 20_000, true).unwrap();
        assert_eq!(run.final_counter, 80_000);
        assert!(run.wall_ms > 0.0);
    }

    #[test]
    fn test_racy_run_never_exceeds_expected() {
        let run = ThreadWorkload.run(4, 50_000, false).unwrap();
        assert!(run.final_counter <= 200_000);
        assert!(run.final_counter > 0);
    }

    #[test]
    fn test_single_racy_worker_is_exact() {
        let run = ThreadWorkload.run(1, 10_000, false).unwrap();
        assert_eq!(run.final_counter, 10_000);
    }
}
