//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::{BenchArgs, Cli, ReportArgs},
    config::env::EnvManager,
    error::Result,
    models::{BenchConfig, Config},
    types::{SyncMode, TestType},
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Build the report configuration: defaults, then .env/environment, then CLI
    pub fn parse_report(&self, args: &ReportArgs) -> Result<Config> {
        let mut config = Config::default();

        self.load_env_file()?;
        config.merge_from_env()?;
        self.apply_report_overrides(&mut config, args);

        config.validate()?;
        Ok(config)
    }

    /// Build the benchmark configuration: defaults, then .env/environment, then CLI
    pub fn parse_bench(&self, args: &BenchArgs) -> Result<BenchConfig> {
        let mut config = BenchConfig::default();

        self.load_env_file()?;
        config.merge_from_env()?;
        self.apply_bench_overrides(&mut config, args);

        config.validate()?;
        Ok(config)
    }

    /// Load .env file if it exists
    fn load_env_file(&self) -> Result<()> {
        EnvManager::load_env_file(self.cli.debug)
    }

    /// Apply report CLI overrides to configuration
    fn apply_report_overrides(&self, config: &mut Config, args: &ReportArgs) {
        if let Some(ref input) = args.input {
            config.input_path = input.clone();
        }

        if let Some(ref output_dir) = args.output_dir {
            config.output_dir = output_dir.clone();
        }

        if let Some(format) = args.format {
            config.chart_format = format;
        }

        if let Some(width) = args.width {
            config.grid_size.0 = width;
        }

        if let Some(height) = args.height {
            config.grid_size.1 = height;
        }

        if let Some(stride) = args.annotate_every {
            config.annotate_every = stride;
        }

        self.apply_output_flags(&mut config.enable_color, &mut config.verbose, &mut config.debug);
    }

    /// Apply bench CLI overrides to configuration
    fn apply_bench_overrides(&self, config: &mut BenchConfig, args: &BenchArgs) {
        if !args.workers.is_empty() {
            config.worker_counts = args.workers.clone();
        } else if let Some(max) = args.max_workers {
            config.worker_counts = (1..=max).collect();
        }

        if let Some(increments) = args.increments {
            config.increments_per_worker = increments;
        }

        if let Some(iterations) = args.iterations {
            config.iterations = iterations;
        }

        if args.processes_only {
            config.test_types = vec![TestType::Processes];
        } else if args.threads_only {
            config.test_types = vec![TestType::Threads];
        }

        if args.sync_only {
            config.sync_modes = vec![SyncMode::Synchronized];
        } else if args.no_sync_only {
            config.sync_modes = vec![SyncMode::Unsynchronized];
        }

        if let Some(ref output) = args.output {
            config.output_path = output.clone();
        }

        self.apply_output_flags(&mut config.enable_color, &mut config.verbose, &mut config.debug);
    }

    fn apply_output_flags(&self, enable_color: &mut bool, verbose: &mut bool, debug: &mut bool) {
        if self.cli.color {
            *enable_color = true;
        } else if self.cli.no_color {
            *enable_color = false;
        } else if *enable_color {
            *enable_color = self.cli.use_colors();
        }

        // CLI-only flags
        *verbose = self.cli.verbose;
        *debug = self.cli.debug;
    }
}

/// Convenience function to load the report configuration from CLI arguments
pub fn load_config(cli: Cli, args: &ReportArgs) -> Result<Config> {
    ConfigParser::new(cli).parse_report(args)
}

/// Convenience function to load the benchmark configuration from CLI arguments
pub fn load_bench_config(cli: Cli, args: &BenchArgs) -> Result<BenchConfig> {
    ConfigParser::new(cli).parse_bench(args)
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Input: {}", config.input_path.display()));
    summary.push(format!("Output directory: {}", config.output_dir.display()));
    summary.push(format!("Chart format: {}", config.chart_format));
    summary.push(format!("Grid size: {}x{}", config.grid_size.0, config.grid_size.1));
    summary.push(format!("Thread chart size: {}x{}", config.single_size.0, config.single_size.1));
    summary.push(format!("Annotate every: {}", config.annotate_every));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

/// Display benchmark configuration summary for debug purposes
pub fn display_bench_summary(config: &BenchConfig) -> String {
    let workers: Vec<String> = config.worker_counts.iter().map(|w| w.to_string()).collect();
    let types: Vec<&str> = config.test_types.iter().map(|t| t.tag()).collect();
    let modes: Vec<&str> = config.sync_modes.iter().map(|m| m.tag()).collect();

    [
        format!("Workers: {}", workers.join(", ")),
        format!("Increments per worker: {}", config.increments_per_worker),
        format!("Iterations: {}", config.iterations),
        format!("Test types: {}", types.join(", ")),
        format!("Sync modes: {}", modes.join(", ")),
        format!("Output: {}", config.output_path.display()),
    ]
    .join("\n")
}
