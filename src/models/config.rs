//! Configuration data models and validation

use crate::types::{AppError, ChartFormat, Result, SyncMode, TestType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Report configuration: where the CSV lives and how charts are rendered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Benchmark CSV to analyze
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// Directory that receives the chart images
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Image format for both charts
    #[serde(default = "default_chart_format")]
    pub chart_format: ChartFormat,

    /// Size of the 2x2 analysis grid in pixels
    #[serde(default = "default_grid_size")]
    pub grid_size: (u32, u32),

    /// Size of the single thread-time chart in pixels
    #[serde(default = "default_single_size")]
    pub single_size: (u32, u32),

    /// Annotate every n-th point of the thread-time chart
    #[serde(default = "default_annotate_every")]
    pub annotate_every: usize,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_dir: default_output_dir(),
            chart_format: default_chart_format(),
            grid_size: default_grid_size(),
            single_size: default_single_size(),
            annotate_every: default_annotate_every(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the 2x2 analysis grid image
    pub fn analysis_chart_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            crate::defaults::ANALYSIS_CHART_STEM,
            self.chart_format.extension()
        ))
    }

    /// Path of the thread execution time image
    pub fn thread_chart_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            crate::defaults::THREAD_CHART_STEM,
            self.chart_format.extension()
        ))
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.input_path.as_os_str().is_empty() {
            return Err(AppError::config("Input path cannot be empty"));
        }

        for (name, (width, height)) in [("grid", self.grid_size), ("single chart", self.single_size)] {
            if !(crate::defaults::MIN_CHART_DIMENSION..=crate::defaults::MAX_CHART_DIMENSION).contains(&width)
                || !(crate::defaults::MIN_CHART_DIMENSION..=crate::defaults::MAX_CHART_DIMENSION).contains(&height)
            {
                return Err(AppError::config(format!(
                    "{} size {}x{} must be between {} and {} pixels per side",
                    name,
                    width,
                    height,
                    crate::defaults::MIN_CHART_DIMENSION,
                    crate::defaults::MAX_CHART_DIMENSION
                )));
            }
        }

        if self.annotate_every == 0 {
            return Err(AppError::config("Annotation stride must be greater than 0"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        self.merge_from_lookup(|key| std::env::var(key).ok())
    }

    /// Merge values from an arbitrary key lookup (environment, tests)
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(input) = lookup("SCALABILITY_DATA") {
            self.input_path = PathBuf::from(input.trim());
        }

        if let Some(output_dir) = lookup("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(output_dir.trim());
        }

        if let Some(format) = lookup("CHART_FORMAT") {
            self.chart_format = format.parse()
                .map_err(|e| AppError::config(format!("Invalid CHART_FORMAT value '{}': {}", format, e)))?;
        }

        if let Some(width) = lookup("CHART_WIDTH") {
            self.grid_size.0 = width.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHART_WIDTH value '{}': {}", width, e)))?;
        }

        if let Some(height) = lookup("CHART_HEIGHT") {
            self.grid_size.1 = height.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHART_HEIGHT value '{}': {}", height, e)))?;
        }

        if let Some(enable_color) = lookup("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Benchmark harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Worker counts to sweep, in run order
    #[serde(default = "default_worker_counts")]
    pub worker_counts: Vec<u32>,

    /// Increments each worker performs per run
    #[serde(default = "default_increments")]
    pub increments_per_worker: u64,

    /// Repetitions per (type, sync, workers) combination
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Concurrency kinds to run
    #[serde(default = "default_test_types")]
    pub test_types: Vec<TestType>,

    /// Synchronisation modes to run
    #[serde(default = "default_sync_modes")]
    pub sync_modes: Vec<SyncMode>,

    /// CSV file the results are written to
    #[serde(default = "default_input_path")]
    pub output_path: PathBuf,

    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            worker_counts: default_worker_counts(),
            increments_per_worker: default_increments(),
            iterations: default_iterations(),
            test_types: default_test_types(),
            sync_modes: default_sync_modes(),
            output_path: default_input_path(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl BenchConfig {
    /// Total number of individual runs the sweep performs
    pub fn total_runs(&self) -> usize {
        self.worker_counts.len() * self.test_types.len() * self.sync_modes.len() * self.iterations as usize
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.worker_counts.is_empty() {
            return Err(AppError::config("At least one worker count is required"));
        }

        if let Some(&bad) = self.worker_counts.iter().find(|&&w| w == 0 || w > crate::defaults::MAX_WORKERS) {
            return Err(AppError::config(format!(
                "Worker count {} must be between 1 and {}",
                bad,
                crate::defaults::MAX_WORKERS
            )));
        }

        if self.increments_per_worker == 0 {
            return Err(AppError::config("Increments per worker must be positive"));
        }

        if self.iterations == 0 {
            return Err(AppError::config("Iterations must be positive"));
        }

        let largest = self.worker_counts.iter().copied().max().unwrap_or(1);
        if u64::from(largest).checked_mul(self.increments_per_worker).is_none() {
            return Err(AppError::validation(format!(
                "{} workers x {} increments does not fit in a 64-bit counter",
                largest, self.increments_per_worker
            )));
        }

        if self.test_types.is_empty() || self.sync_modes.is_empty() {
            return Err(AppError::config("Selected filters leave nothing to run"));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(AppError::config("Output path cannot be empty"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        self.merge_from_lookup(|key| std::env::var(key).ok())
    }

    /// Merge values from an arbitrary key lookup (environment, tests)
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(workers) = lookup("BENCH_WORKERS") {
            self.worker_counts = parse_worker_list(&workers)
                .map_err(|e| AppError::config(format!("Invalid BENCH_WORKERS value '{}': {}", workers, e)))?;
        }

        if let Some(increments) = lookup("BENCH_INCREMENTS") {
            self.increments_per_worker = increments.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BENCH_INCREMENTS value '{}': {}", increments, e)))?;
        }

        if let Some(iterations) = lookup("BENCH_ITERATIONS") {
            self.iterations = iterations.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BENCH_ITERATIONS value '{}': {}", iterations, e)))?;
        }

        if let Some(output) = lookup("BENCH_OUTPUT") {
            self.output_path = PathBuf::from(output.trim());
        }

        if let Some(enable_color) = lookup("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Parse a comma-separated worker list such as `1,2,4,8`
pub fn parse_worker_list(value: &str) -> std::result::Result<Vec<u32>, std::num::ParseIntError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

// Default value functions for serde
fn default_input_path() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_DATA_FILE)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_chart_format() -> ChartFormat {
    ChartFormat::Png
}

fn default_grid_size() -> (u32, u32) {
    crate::defaults::DEFAULT_GRID_SIZE
}

fn default_single_size() -> (u32, u32) {
    crate::defaults::DEFAULT_SINGLE_SIZE
}

fn default_annotate_every() -> usize {
    crate::defaults::DEFAULT_ANNOTATE_EVERY
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

fn default_worker_counts() -> Vec<u32> {
    let cpus = num_cpus::get().max(1) as u32;
    (1..=cpus.min(crate::defaults::MAX_WORKERS)).collect()
}

fn default_increments() -> u64 {
    crate::defaults::DEFAULT_INCREMENTS_PER_WORKER
}

fn default_iterations() -> u32 {
    crate::defaults::DEFAULT_TEST_ITERATIONS
}

fn default_test_types() -> Vec<TestType> {
    vec![TestType::Processes, TestType::Threads]
}

fn default_sync_modes() -> Vec<SyncMode> {
    vec![SyncMode::Synchronized, SyncMode::Unsynchronized]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.input_path, PathBuf::from("scalability_data.csv"));
    }

    #[test]
    fn test_default_chart_paths() {
        let config = Config::default();
        assert_eq!(config.analysis_chart_path(), PathBuf::from("./scalability_analysis.png"));
        assert_eq!(config.thread_chart_path(), PathBuf::from("./tiempo_vs_hilos.png"));
    }

    #[test]
    fn test_svg_chart_paths() {
        let mut config = Config::default();
        config.chart_format = ChartFormat::Svg;
        config.output_dir = PathBuf::from("out");
        assert_eq!(config.analysis_chart_path(), PathBuf::from("out/scalability_analysis.svg"));
    }

    #[test]
    fn test_tiny_chart_invalid() {
        let mut config = Config::default();
        config.grid_size = (10, 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_annotation_stride_invalid() {
        let mut config = Config::default();
        config.annotate_every = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_report_values() {
        let mut config = Config::default();
        config
            .merge_from_lookup(lookup_from(&[
                ("SCALABILITY_DATA", "results/run.csv"),
                ("CHART_FORMAT", "svg"),
                ("CHART_WIDTH", "1600"),
                ("ENABLE_COLOR", "false"),
            ]))
            .unwrap();
        assert_eq!(config.input_path, PathBuf::from("results/run.csv"));
        assert_eq!(config.chart_format, ChartFormat::Svg);
        assert_eq!(config.grid_size.0, 1600);
        assert!(!config.enable_color);
    }

    #[test]
    fn test_merge_rejects_bad_number() {
        let mut config = Config::default();
        let result = config.merge_from_lookup(lookup_from(&[("CHART_HEIGHT", "tall")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_default_bench_config_is_valid() {
        let config = BenchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.worker_counts[0], 1);
        assert_eq!(config.increments_per_worker, 1_000_000);
        assert_eq!(config.iterations, 3);
    }

    #[test]
    fn test_bench_zero_workers_invalid() {
        let mut config = BenchConfig::default();
        config.worker_counts = vec![1, 0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bench_counter_overflow_invalid() {
        let mut config = BenchConfig::default();
        config.worker_counts = vec![1, 4];
        config.increments_per_worker = u64::MAX / 2;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        config.worker_counts = vec![1];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bench_empty_selection_invalid() {
        let mut config = BenchConfig::default();
        config.test_types.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bench_total_runs() {
        let mut config = BenchConfig::default();
        config.worker_counts = vec![1, 2, 4];
        config.iterations = 2;
        assert_eq!(config.total_runs(), 3 * 2 * 2 * 2);
    }

    #[test]
    fn test_merge_bench_values() {
        let mut config = BenchConfig::default();
        config
            .merge_from_lookup(lookup_from(&[
                ("BENCH_WORKERS", "1, 2,8"),
                ("BENCH_INCREMENTS", "5000"),
                ("BENCH_ITERATIONS", "1"),
            ]))
            .unwrap();
        assert_eq!(config.worker_counts, vec![1, 2, 8]);
        assert_eq!(config.increments_per_worker, 5000);
        assert_eq!(config.iterations, 1);
    }

    #[test]
    fn test_parse_worker_list_rejects_garbage() {
        assert!(parse_worker_list("1,two").is_err());
        assert_eq!(parse_worker_list("4,").unwrap(), vec![4]);
    }
}
