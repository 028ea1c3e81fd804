//! Colored formatter implementation with terminal color support
//!
//! Same text as the plain formatter, with ANSI colors on headings,
//! best values and race-condition counts.

use crate::{
    error::Result,
    models::BenchmarkRecord,
    stats::{RaceConditionSummary, TypeSummary},
};
use super::formatter::{bench_row, bench_table_format, display_path, FormattingOptions, OutputFormatter, PlainFormatter};
use colored::*;
use std::path::Path;

/// Severity of a lost-update percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LossLevel {
    /// No increments lost
    None,
    /// Less than 10% lost
    Minor,
    /// 10% to 50% lost
    Severe,
    /// More than half of the increments lost
    Critical,
}

impl LossLevel {
    /// Classify a loss percentage
    pub fn from_percent(percent: f64) -> Self {
        if percent <= 0.0 {
            Self::None
        } else if percent < 10.0 {
            Self::Minor
        } else if percent <= 50.0 {
            Self::Severe
        } else {
            Self::Critical
        }
    }

    /// Get color for this level
    pub fn color(&self) -> Color {
        match self {
            Self::None => Color::Green,
            Self::Minor => Color::Yellow,
            Self::Severe => Color::Red,
            Self::Critical => Color::BrightRed,
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub highlight: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            highlight: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Apply bold formatting if colors are enabled
    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Colored and bold, or plain when colors are disabled
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_chart_saved(&self, path: &Path, specific: bool) -> Result<String> {
        let kind = if specific { "Gráfico específico" } else { "Gráfico" };
        Ok(format!(
            "{} {} guardado como: {}",
            self.colorize("✓", self.color_scheme.success),
            kind,
            self.bold(&display_path(path))
        ))
    }

    fn format_header(&self, title: &str) -> Result<String> {
        let header = format!("=== {} ===", title);
        Ok(self.emphasize(&header, self.color_scheme.header).to_string())
    }

    fn format_type_summary(&self, summary: &TypeSummary) -> Result<String> {
        let noun = summary.test_type.worker_noun();
        let mut lines = vec![format!("{}:", self.bold(summary.test_type.tag()))];

        match (&summary.best_time, &summary.best_throughput) {
            (Some(time), Some(throughput)) => {
                lines.push(format!(
                    "  Mejor tiempo: {} ms con {} {}",
                    self.colorize(&format!("{:.2}", time.value), self.color_scheme.highlight),
                    time.workers,
                    noun
                ));
                lines.push(format!(
                    "  Mejor throughput: {} ops/ms con {} {}",
                    self.colorize(&format!("{:.2}", throughput.value), self.color_scheme.highlight),
                    throughput.workers,
                    noun
                ));
            }
            _ => lines.push(format!("  {}", self.dimmed("Sin datos"))),
        }

        if self.options.verbose_mode && !summary.is_empty() {
            lines.push(format!("  Ejecuciones: {}", summary.runs));
        }

        Ok(lines.join("\n"))
    }

    fn format_race_conditions(&self, summary: &RaceConditionSummary) -> Result<String> {
        let count_color = if summary.incorrect_runs == 0 {
            self.color_scheme.success
        } else {
            self.color_scheme.error
        };

        let mut lines = vec![
            self.emphasize("RACE CONDITIONS DETECTADAS:", self.color_scheme.warning).to_string(),
            format!(
                "  Casos incorrectos: {} de {}",
                self.colorize(&summary.incorrect_runs.to_string(), count_color),
                summary.total_runs
            ),
        ];

        if let Some(loss) = summary.average_loss_percent {
            lines.push(format!(
                "  Pérdida promedio de datos: {}",
                self.colorize(&format!("{:.1}%", loss), LossLevel::from_percent(loss).color())
            ));
        }

        Ok(lines.join("\n"))
    }

    fn format_bench_record(&self, record: &BenchmarkRecord) -> Result<String> {
        let line = self.plain_formatter.format_bench_record(record)?;
        let color = if record.is_correct {
            self.color_scheme.success
        } else {
            self.color_scheme.error
        };
        Ok(self.colorize(&line, color).to_string())
    }

    fn format_bench_table(&self, records: &[BenchmarkRecord]) -> Result<String> {
        let rows: Vec<Vec<String>> = records.iter().map(bench_row).collect();
        let table = self
            .plain_formatter
            .create_table(&bench_table_format(self.options.table_borders), &rows)?;

        // Highlight rows with lost increments after layout so widths stay right
        let mut highlighted = Vec::new();
        for line in table.lines() {
            if line.contains("/") && line.trim_end_matches('|').trim_end().ends_with("no") {
                highlighted.push(self.colorize(line, self.color_scheme.error).to_string());
            } else if line.starts_with('+') {
                highlighted.push(self.colorize(line, self.color_scheme.muted).to_string());
            } else {
                highlighted.push(line.to_string());
            }
        }

        Ok(highlighted.join("\n"))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("Error:", self.color_scheme.error), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("Advertencia:", self.color_scheme.warning), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("✓", self.color_scheme.success), message))
    }
}
