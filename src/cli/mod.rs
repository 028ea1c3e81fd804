//! Command-line interface definitions

use crate::types::ChartFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Scalability Analyzer - process vs thread benchmark harness and report generator
#[derive(Parser, Debug, Clone)]
#[command(name = "scalab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Force colored output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands; `report` runs when none is given
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render charts and print summary statistics from a benchmark CSV
    Report(ReportArgs),

    /// Run the process/thread counter benchmark and write the CSV
    Bench(BenchArgs),

    /// Single benchmark worker process (spawned by `bench`)
    #[command(hide = true)]
    Worker(WorkerArgs),
}

/// Options of the `report` command
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Benchmark CSV to read [default: scalability_data.csv]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory that receives the chart images [default: .]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Chart image format (png or svg)
    #[arg(long)]
    pub format: Option<ChartFormat>,

    /// Width of the analysis grid in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Height of the analysis grid in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Annotate every n-th point of the thread chart
    #[arg(long)]
    pub annotate_every: Option<usize>,
}

/// Options of the `bench` command
#[derive(Args, Debug, Clone, Default)]
pub struct BenchArgs {
    /// Worker counts to sweep (comma-separated)
    #[arg(short, long, value_delimiter = ',', conflicts_with = "max_workers")]
    pub workers: Vec<u32>,

    /// Sweep worker counts 1..=N
    #[arg(long)]
    pub max_workers: Option<u32>,

    /// Increments per worker
    #[arg(short, long)]
    pub increments: Option<u64>,

    /// Repetitions per combination
    #[arg(short = 'r', long)]
    pub iterations: Option<u32>,

    /// Only run process-based tests
    #[arg(short, long, conflicts_with = "threads_only")]
    pub processes_only: bool,

    /// Only run thread-based tests
    #[arg(short, long)]
    pub threads_only: bool,

    /// Only run synchronized tests
    #[arg(short, long, conflicts_with = "no_sync_only")]
    pub sync_only: bool,

    /// Only run unsynchronized tests
    #[arg(short, long)]
    pub no_sync_only: bool,

    /// CSV file to write [default: scalability_data.csv]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Options of the hidden `worker` command
#[derive(Args, Debug, Clone)]
pub struct WorkerArgs {
    /// Shared counter mapping created by the parent
    #[arg(long)]
    pub shm: PathBuf,

    /// Worker index, for log lines only
    #[arg(long)]
    pub id: u32,

    /// Increments to perform
    #[arg(long)]
    pub increments: u64,

    /// Take the shared lock around each increment
    #[arg(long)]
    pub sync: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if let Some(Command::Bench(args)) = &self.command {
            if args.workers.iter().any(|&w| w == 0) {
                return Err("Worker counts must be positive".to_string());
            }
            if args.max_workers == Some(0) {
                return Err("--max-workers must be positive".to_string());
            }
        }

        Ok(())
    }

    /// The command to run, defaulting to `report` with default options
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Report(ReportArgs::default()))
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Configuration Summary:\n");
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        match self.command() {
            Command::Report(args) => {
                summary.push_str("  Command: report\n");
                if let Some(ref input) = args.input {
                    summary.push_str(&format!("  Input: {}\n", input.display()));
                }
                if let Some(ref output_dir) = args.output_dir {
                    summary.push_str(&format!("  Output directory: {}\n", output_dir.display()));
                }
            }
            Command::Bench(args) => {
                summary.push_str("  Command: bench\n");
                if !args.workers.is_empty() {
                    let workers: Vec<String> = args.workers.iter().map(|w| w.to_string()).collect();
                    summary.push_str(&format!("  Workers: {}\n", workers.join(", ")));
                }
            }
            Command::Worker(args) => {
                summary.push_str(&format!("  Command: worker {}\n", args.id));
            }
        }

        summary
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    // Default to true on Unix-like systems, false on Windows
    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_no_subcommand_defaults_to_report() {
        let cli = Cli::try_parse_from(["scalab"]).unwrap();
        assert!(matches!(cli.command(), Command::Report(args) if args.input.is_none()));
    }

    #[test]
    fn test_report_options() {
        let cli = Cli::try_parse_from([
            "scalab", "report", "--input", "data.csv", "-o", "charts", "--format", "svg",
        ])
        .unwrap();
        match cli.command() {
            Command::Report(args) => {
                assert_eq!(args.input, Some(PathBuf::from("data.csv")));
                assert_eq!(args.output_dir, Some(PathBuf::from("charts")));
                assert_eq!(args.format, Some(ChartFormat::Svg));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(Cli::try_parse_from(["scalab", "report", "--format", "gif"]).is_err());
    }

    #[test]
    fn test_bench_short_flags() {
        let cli = Cli::try_parse_from([
            "scalab", "bench", "-w", "1,2,4", "-i", "500", "-r", "2", "-t", "-s",
        ])
        .unwrap();
        match cli.command() {
            Command::Bench(args) => {
                assert_eq!(args.workers, vec![1, 2, 4]);
                assert_eq!(args.increments, Some(500));
                assert_eq!(args.iterations, Some(2));
                assert!(args.threads_only);
                assert!(args.sync_only);
                assert!(!args.processes_only);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_filters_rejected() {
        assert!(Cli::try_parse_from(["scalab", "bench", "-p", "-t"]).is_err());
        assert!(Cli::try_parse_from(["scalab", "bench", "-s", "-n"]).is_err());
        assert!(Cli::try_parse_from(["scalab", "bench", "-w", "2", "--max-workers", "4"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["scalab", "report", "--verbose", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_color_conflict() {
        let cli = Cli::try_parse_from(["scalab", "--color", "--no-color"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let cli = Cli::try_parse_from(["scalab", "bench", "-w", "0,2"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_worker_command_is_parseable() {
        let cli = Cli::try_parse_from([
            "scalab", "worker", "--shm", "/tmp/x", "--id", "3", "--increments", "10", "--sync",
        ])
        .unwrap();
        match cli.command() {
            Command::Worker(args) => {
                assert_eq!(args.id, 3);
                assert!(args.sync);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
