//! Scalability Analyzer
//!
//! Runs the process-vs-thread counter benchmark and turns its CSV output
//! into comparison charts (execution time, throughput, CPU utilization,
//! speedup) plus a console summary of the best runs and race-condition
//! losses.

pub mod app;
pub mod bench;
pub mod charts;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{BenchConfig, BenchmarkRecord, Config};
pub use data::Dataset;
pub use stats::{ScalabilityAnalyzer, ScalabilitySummary};
pub use types::{ChartFormat, SyncMode, TestType};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_DATA_FILE: &str = "scalability_data.csv";
    pub const ANALYSIS_CHART_STEM: &str = "scalability_analysis";
    pub const THREAD_CHART_STEM: &str = "tiempo_vs_hilos";

    pub const DEFAULT_GRID_SIZE: (u32, u32) = (1500, 1200);
    pub const DEFAULT_SINGLE_SIZE: (u32, u32) = (1000, 600);
    pub const MIN_CHART_DIMENSION: u32 = 200;
    pub const MAX_CHART_DIMENSION: u32 = 8000;
    pub const DEFAULT_ANNOTATE_EVERY: usize = 2;

    pub const DEFAULT_INCREMENTS_PER_WORKER: u64 = 1_000_000;
    pub const DEFAULT_TEST_ITERATIONS: u32 = 3;
    pub const MAX_WORKERS: u32 = 512;

    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
