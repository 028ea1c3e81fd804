//! Configuration validation rules that produce warnings rather than errors

use crate::{
    error::Result,
    models::{BenchConfig, Config},
};

/// Configuration validator with advisory checks
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a report configuration; hard errors come from `Config::validate`
    pub fn validate_report(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();

        let (width, height) = config.grid_size;
        if u64::from(width) * u64::from(height) > 16_000_000 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Analysis grid {}x{} is very large and may be slow to encode", width, height),
            ));
        }

        if !config.output_dir.exists() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Output directory '{}' will be created", config.output_dir.display()),
            ));
        }

        Ok(warnings)
    }

    /// Validate a benchmark configuration
    pub fn validate_bench(config: &BenchConfig) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        let cpus = num_cpus::get() as u32;

        if let Some(&max) = config.worker_counts.iter().max() {
            if max > cpus * 4 {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("{} workers oversubscribe {} CPUs; timings will be dominated by scheduling", max, cpus),
                ));
            }
        }

        if !config.worker_counts.contains(&1) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "No single-worker run selected; the report cannot compute speedup".to_string(),
            ));
        }

        let total_increments = config.worker_counts.iter().map(|&w| u64::from(w)).sum::<u64>()
            * config.increments_per_worker
            * u64::from(config.iterations)
            * config.test_types.len() as u64
            * config.sync_modes.len() as u64;
        if total_increments > 50_000_000_000 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Sweep performs {} increments in total and may take a long time", total_increments),
            ));
        }

        Ok(warnings)
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            let level = match self.level {
                ValidationLevel::Info => self.level.as_str().blue(),
                ValidationLevel::Warning => self.level.as_str().yellow(),
            };
            format!("[{}] {}", level, self.message)
        } else {
            format!("[{}] {}", self.level.as_str(), self.message)
        }
    }
}

/// Convenience function for report configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_report(config)
}
