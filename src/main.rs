//! Scalability Analyzer - Main CLI Application
//!
//! Benchmarks processes against threads on a shared counter and renders the
//! comparison charts and summary from the resulting CSV.

use clap::Parser;
use scalability_analyzer::{
    app::App,
    cli::{Cli, Command},
    error::{AppError, Result},
    PKG_NAME, VERSION,
};
use std::{error::Error, process};

fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    // Parse command line arguments
    let cli = Cli::parse();
    let use_color = cli.use_colors();

    if let Err(e) = run_application(cli) {
        eprintln!("Error: {}", e.format_for_console(use_color));

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

/// Main application logic
fn run_application(cli: Cli) -> Result<()> {
    cli.validate().map_err(AppError::config)?;

    // Workers are spawned by `bench`; keep their output clean
    if cli.debug && !matches!(cli.command(), Command::Worker(_)) {
        eprintln!("{} v{}", PKG_NAME, VERSION);
        eprintln!(
            "Build: {} ({})",
            option_env!("BUILD_TIME").unwrap_or("unknown"),
            option_env!("GIT_COMMIT").unwrap_or("unknown")
        );
        eprintln!("{}", cli.get_config_summary());
    }

    App::new(cli)?.run()
}

/// Print help for errors the user can fix
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::DataNotFound(_) => {
            eprintln!();
            eprintln!("Sugerencias:");
            eprintln!("  - Ejecuta `scalab bench` primero para generar los datos");
            eprintln!("  - Indica otro archivo con --input o SCALABILITY_DATA");
        }
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - CHART_FORMAT must be png or svg");
            eprintln!("  - Worker counts must be positive integers (e.g. --workers 1,2,4)");
        }
        AppError::Parse(_) => {
            eprintln!();
            eprintln!("Data help:");
            eprintln!("  - The CSV header must be: test_type,sync_type,num_threads,execution_time_ms,");
            eprintln!("    throughput_ops_ms,cpu_utilization_percent,expected_counter,final_counter,is_correct");
            eprintln!("  - Regenerate the file with `scalab bench`");
        }
        AppError::Chart(_) => {
            eprintln!();
            eprintln!("Chart troubleshooting:");
            eprintln!("  - Check that the output directory is writable");
            eprintln!("  - Try --format svg");
        }
        AppError::Benchmark(_) => {
            eprintln!();
            eprintln!("Benchmark troubleshooting:");
            eprintln!("  - Reduce --workers or --increments");
            eprintln!("  - Use --threads-only if worker processes cannot be spawned");
        }
        _ => {}
    }
}
