//! Output formatting and display system
//!
//! This module provides the console rendering of the scalability summary
//! and benchmark results, in colored or plain text.

mod formatter;
mod colored;

pub use formatter::{
    display_path,
    OutputFormatter,
    PlainFormatter,
    TableFormat,
    FormattingOptions,
    Column,
    Alignment,
    RowData,
};
pub use colored::{
    ColoredFormatter,
    ColorScheme,
    LossLevel,
};

use crate::{
    error::Result,
    models::BenchmarkRecord,
    stats::ScalabilitySummary,
};
use std::path::Path;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            table_borders: true,
            max_width: 120,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}

/// Main output coordinator that assembles console output
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
}

impl OutputCoordinator {
    /// Create a new output coordinator with the specified formatter
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }

    /// Create a coordinator from color and verbosity flags
    pub fn from_flags(enable_color: bool, verbose: bool) -> Self {
        Self::new(OutputFormatterFactory::create_formatter(enable_color, verbose))
    }

    /// Confirmation lines for the two chart files
    pub fn display_saved_charts(&self, analysis: &Path, thread_chart: &Path) -> Result<String> {
        Ok(format!(
            "{}\n{}",
            self.formatter.format_chart_saved(analysis, false)?,
            self.formatter.format_chart_saved(thread_chart, true)?
        ))
    }

    /// Statistics section, preceded by a blank line
    pub fn display_summary(&self, summary: &ScalabilitySummary) -> Result<String> {
        Ok(format!("\n{}", self.formatter.format_summary(summary)?))
    }

    /// Progress line for one benchmark combination
    pub fn display_bench_record(&self, record: &BenchmarkRecord) -> Result<String> {
        self.formatter.format_bench_record(record)
    }

    /// Final benchmark table and the CSV location
    pub fn display_bench_results(&self, records: &[BenchmarkRecord], csv_path: &Path) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.formatter.format_header("RESULTADOS DEL BENCHMARK")?);
        output.push('\n');
        output.push_str(&self.formatter.format_bench_table(records)?);
        output.push('\n');
        output.push_str(&self.formatter.format_success(&format!(
            "Datos guardados en: {}",
            display_path(csv_path)
        ))?);
        Ok(output)
    }

    /// Display a warning
    pub fn display_warning(&self, warning: &str) -> Result<String> {
        self.formatter.format_warning(warning)
    }

    /// Display an error
    pub fn display_error(&self, error: &str) -> Result<String> {
        self.formatter.format_error(error)
    }
}
