//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use crate::{
    error::{AppError, Result},
    models::BenchmarkRecord,
    stats::{RaceConditionSummary, ScalabilitySummary, TypeSummary},
};
use std::fmt::Write as _;
use std::path::Path;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format the confirmation line for a written chart
    fn format_chart_saved(&self, path: &Path, specific: bool) -> Result<String>;

    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the best runs of one concurrency kind
    fn format_type_summary(&self, summary: &TypeSummary) -> Result<String>;

    /// Format the lost-update block
    fn format_race_conditions(&self, summary: &RaceConditionSummary) -> Result<String>;

    /// Format the whole statistics section
    fn format_summary(&self, summary: &ScalabilitySummary) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.format_header("ESTADÍSTICAS DE ESCALABILIDAD")?);
        output.push('\n');
        output.push_str(&self.format_type_summary(&summary.threads)?);
        output.push_str("\n\n");
        output.push_str(&self.format_type_summary(&summary.processes)?);

        if let Some(races) = &summary.race_conditions {
            output.push_str("\n\n");
            output.push_str(&self.format_race_conditions(races)?);
        }

        Ok(output)
    }

    /// Format one aggregated benchmark row as a progress line
    fn format_bench_record(&self, record: &BenchmarkRecord) -> Result<String>;

    /// Format all benchmark rows as a table
    fn format_bench_table(&self, records: &[BenchmarkRecord]) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
    /// Maximum output width
    pub max_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            max_width: 120,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Show borders around table
    pub show_borders: bool,
    /// Show header row
    pub show_header: bool,
    /// Minimum column width
    pub min_column_width: usize,
    /// Maximum column width
    pub max_column_width: usize,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    /// Column header
    pub header: String,
    /// Column alignment
    pub alignment: Alignment,
    /// Minimum width
    pub min_width: usize,
    /// Maximum width
    pub max_width: usize,
}

impl Column {
    fn new(header: &str, alignment: Alignment) -> Self {
        Self {
            header: header.to_string(),
            alignment,
            min_width: header.chars().count(),
            max_width: 20,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Path as shown to the user; `./name` is printed as `name`
pub fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}

/// Columns of the benchmark results table
pub(crate) fn bench_table_format(show_borders: bool) -> TableFormat {
    TableFormat {
        columns: vec![
            Column::new("Tipo", Alignment::Left),
            Column::new("Sync", Alignment::Left),
            Column::new("Trabajadores", Alignment::Right),
            Column::new("Tiempo (ms)", Alignment::Right),
            Column::new("Throughput (ops/ms)", Alignment::Right),
            Column::new("CPU (%)", Alignment::Right),
            Column::new("Contador", Alignment::Right),
            Column::new("Correcto", Alignment::Center),
        ],
        show_borders,
        show_header: true,
        min_column_width: 4,
        max_column_width: 24,
    }
}

/// Cells of one benchmark row, in table column order
pub(crate) fn bench_row(record: &BenchmarkRecord) -> RowData {
    vec![
        record.test_type.tag().to_string(),
        record.sync_type.tag().to_string(),
        record.num_threads.to_string(),
        format!("{:.2}", record.execution_time_ms),
        format!("{:.2}", record.throughput_ops_ms),
        format!("{:.1}", record.cpu_utilization_percent),
        format!("{}/{}", record.final_counter, record.expected_counter),
        if record.is_correct { "sí" } else { "no" }.to_string(),
    ]
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Create a table with the given format and data
    pub(crate) fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> Result<String> {
        if rows.is_empty() {
            return Ok(String::new());
        }

        let column_widths = self.calculate_column_widths(format, rows);

        let mut output = String::new();

        // Header
        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &column_widths, format));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }
        }

        for row in rows {
            output.push_str(&self.create_row(row, &column_widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        Ok(output.trim_end().to_string())
    }

    /// Calculate column widths in characters
    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        let num_columns = format.columns.len().max(
            rows.iter().map(|r| r.len()).max().unwrap_or(0)
        );

        (0..num_columns)
            .map(|col_idx| {
                let column = format.columns.get(col_idx);
                let mut width = column
                    .map(|c| c.min_width.max(c.header.chars().count()))
                    .unwrap_or(format.min_column_width);

                for row in rows {
                    if let Some(cell) = row.get(col_idx) {
                        width = width.max(cell.chars().count());
                    }
                }

                width.min(column.map(|c| c.max_width.max(c.header.chars().count())).unwrap_or(format.max_column_width))
            })
            .collect()
    }

    /// Create a table row
    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map(|c| &c.alignment).unwrap_or(&Alignment::Left);
            let padded_cell = self.align_text(cell, width, alignment);

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&padded_cell);
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    /// Create horizontal border for table
    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }

    /// Align text within specified width
    fn align_text(&self, text: &str, width: usize, alignment: &Alignment) -> String {
        let len = text.chars().count();
        if len >= width {
            return text.chars().take(width).collect();
        }

        let padding = width - len;
        match alignment {
            Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
            Alignment::Right => format!("{}{}", " ".repeat(padding), text),
            Alignment::Center => {
                let left_pad = padding / 2;
                let right_pad = padding - left_pad;
                format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
            }
        }
    }
}

fn fmt_error(e: std::fmt::Error) -> AppError {
    AppError::internal(format!("Failed to format output: {}", e))
}

impl OutputFormatter for PlainFormatter {
    fn format_chart_saved(&self, path: &Path, specific: bool) -> Result<String> {
        let kind = if specific { "Gráfico específico" } else { "Gráfico" };
        Ok(format!("✓ {} guardado como: {}", kind, display_path(path)))
    }

    fn format_header(&self, title: &str) -> Result<String> {
        Ok(format!("=== {} ===", title))
    }

    fn format_type_summary(&self, summary: &TypeSummary) -> Result<String> {
        let mut output = String::new();
        let noun = summary.test_type.worker_noun();

        write!(output, "{}:", summary.test_type.tag()).map_err(fmt_error)?;

        match (&summary.best_time, &summary.best_throughput) {
            (Some(time), Some(throughput)) => {
                write!(output, "\n  Mejor tiempo: {:.2} ms con {} {}", time.value, time.workers, noun)
                    .map_err(fmt_error)?;
                write!(output, "\n  Mejor throughput: {:.2} ops/ms con {} {}", throughput.value, throughput.workers, noun)
                    .map_err(fmt_error)?;
            }
            _ => {
                write!(output, "\n  Sin datos").map_err(fmt_error)?;
            }
        }

        if self.options.verbose_mode && !summary.is_empty() {
            write!(output, "\n  Ejecuciones: {}", summary.runs).map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_race_conditions(&self, summary: &RaceConditionSummary) -> Result<String> {
        let mut output = String::new();

        write!(output, "RACE CONDITIONS DETECTADAS:").map_err(fmt_error)?;
        write!(output, "\n  Casos incorrectos: {} de {}", summary.incorrect_runs, summary.total_runs)
            .map_err(fmt_error)?;
        if let Some(loss) = summary.average_loss_percent {
            write!(output, "\n  Pérdida promedio de datos: {:.1}%", loss).map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_bench_record(&self, record: &BenchmarkRecord) -> Result<String> {
        let status = if record.is_correct { "OK" } else { "INCORRECTO" };
        Ok(format!(
            "{} {} con {} {}: {:.2} ms, {:.2} ops/ms, CPU {:.1}%, contador {}/{} [{}]",
            record.test_type.tag(),
            record.sync_type.tag(),
            record.num_threads,
            record.test_type.worker_noun(),
            record.execution_time_ms,
            record.throughput_ops_ms,
            record.cpu_utilization_percent,
            record.final_counter,
            record.expected_counter,
            status
        ))
    }

    fn format_bench_table(&self, records: &[BenchmarkRecord]) -> Result<String> {
        let rows: Vec<RowData> = records.iter().map(bench_row).collect();
        self.create_table(&bench_table_format(self.options.table_borders), &rows)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("Error: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("Advertencia: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("✓ {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::BestResult;
    use crate::types::{SyncMode, TestType};
    use std::path::PathBuf;

    fn formatter() -> PlainFormatter {
        PlainFormatter::new(FormattingOptions {
            enable_color: false,
            ..FormattingOptions::default()
        })
    }

    fn thread_summary() -> TypeSummary {
        TypeSummary {
            test_type: TestType::Threads,
            runs: 2,
            best_time: Some(BestResult { value: 55.0, workers: 2 }),
            best_throughput: Some(BestResult { value: 36.3636, workers: 2 }),
        }
    }

    #[test]
    fn test_chart_saved_lines() {
        let f = formatter();
        assert_eq!(
            f.format_chart_saved(&PathBuf::from("./scalability_analysis.png"), false).unwrap(),
            "✓ Gráfico guardado como: scalability_analysis.png"
        );
        assert_eq!(
            f.format_chart_saved(&PathBuf::from("out/tiempo_vs_hilos.png"), true).unwrap(),
            "✓ Gráfico específico guardado como: out/tiempo_vs_hilos.png"
        );
    }

    #[test]
    fn test_type_summary_lines() {
        let text = formatter().format_type_summary(&thread_summary()).unwrap();
        assert_eq!(
            text,
            "HILOS:\n  Mejor tiempo: 55.00 ms con 2 hilos\n  Mejor throughput: 36.36 ops/ms con 2 hilos"
        );
    }

    #[test]
    fn test_process_summary_uses_process_noun() {
        let summary = TypeSummary {
            test_type: TestType::Processes,
            runs: 1,
            best_time: Some(BestResult { value: 70.0, workers: 4 }),
            best_throughput: Some(BestResult { value: 10.0, workers: 4 }),
        };
        let text = formatter().format_type_summary(&summary).unwrap();
        assert!(text.starts_with("PROCESOS:"));
        assert!(text.contains("Mejor tiempo: 70.00 ms con 4 procesos"));
    }

    #[test]
    fn test_empty_subset_prints_no_data() {
        let summary = TypeSummary::from_rows(TestType::Processes, &[]);
        let text = formatter().format_type_summary(&summary).unwrap();
        assert_eq!(text, "PROCESOS:\n  Sin datos");
    }

    #[test]
    fn test_race_condition_block() {
        let f = formatter();
        let with_loss = RaceConditionSummary {
            total_runs: 2,
            incorrect_runs: 1,
            average_loss_percent: Some(20.0),
        };
        assert_eq!(
            f.format_race_conditions(&with_loss).unwrap(),
            "RACE CONDITIONS DETECTADAS:\n  Casos incorrectos: 1 de 2\n  Pérdida promedio de datos: 20.0%"
        );

        let clean = RaceConditionSummary {
            total_runs: 3,
            incorrect_runs: 0,
            average_loss_percent: None,
        };
        assert!(!f.format_race_conditions(&clean).unwrap().contains("Pérdida"));
    }

    #[test]
    fn test_full_summary_layout() {
        let summary = ScalabilitySummary {
            threads: thread_summary(),
            processes: TypeSummary::from_rows(TestType::Processes, &[]),
            race_conditions: None,
            generated_at: chrono::Utc::now(),
        };
        let text = formatter().format_summary(&summary).unwrap();
        assert!(text.starts_with("=== ESTADÍSTICAS DE ESCALABILIDAD ===\nHILOS:"));
        assert!(text.contains("\n\nPROCESOS:\n  Sin datos"));
        assert!(!text.contains("RACE CONDITIONS"));
    }

    #[test]
    fn test_bench_table() {
        let record = BenchmarkRecord::from_measurement(
            TestType::Threads,
            SyncMode::Unsynchronized,
            4,
            12.5,
            310.0,
            4000,
            3100,
        );
        let table = formatter().format_bench_table(&[record]).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("Trabajadores"));
        assert!(lines[3].contains("3100/4000"));
        assert!(lines[3].contains("no"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(formatter().format_bench_table(&[]).unwrap(), "");
    }
}
