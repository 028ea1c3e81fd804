//! Main application orchestration and execution

use crate::{
    bench::{self, BenchmarkRunner},
    charts::{analysis_panels, thread_time_panel, ChartRenderer},
    cli::{BenchArgs, Cli, Command, ReportArgs},
    config::{
        display_bench_summary, display_config_summary, load_bench_config, load_config, ConfigValidator,
    },
    data::Dataset,
    error::Result,
    logging::{Logger, LoggerFactory, PerformanceLogger},
    models::{BenchConfig, Config},
    output::OutputCoordinator,
    stats::ScalabilityAnalyzer,
};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self { cli })
    }

    /// Run the selected command
    pub fn run(self) -> Result<()> {
        match self.cli.command() {
            Command::Report(args) => self.run_report(&args),
            Command::Bench(args) => self.run_bench(&args),
            Command::Worker(args) => bench::run_worker(&args),
        }
    }

    fn run_report(&self, args: &ReportArgs) -> Result<()> {
        let config = load_config(self.cli.clone(), args)?;
        let factory = LoggerFactory::new(&config);
        let logger = factory.create_logger("REPORT");
        let mut perf = factory.create_performance_logger();

        if config.debug {
            eprintln!("{}", display_config_summary(&config));
        }

        let warnings = ConfigValidator::validate_report(&config)?;
        crate::log_debug!(logger, "{} configuration advisories", warnings.len());
        for warning in warnings {
            logger
                .debug("Configuration advisory")
                .field("warning", warning.format(false))
                .log();
        }

        ReportPipeline::new(&config, &logger, &mut perf).run()
    }

    fn run_bench(&self, args: &BenchArgs) -> Result<()> {
        let config = load_bench_config(self.cli.clone(), args)?;
        let factory = LoggerFactory::from_flags(config.verbose, config.debug, config.enable_color);
        let logger = factory.create_logger("BENCH");
        let mut perf = factory.create_performance_logger();
        let output = OutputCoordinator::from_flags(config.enable_color, config.verbose);

        if config.debug {
            eprintln!("{}", display_bench_summary(&config));
        }

        for warning in ConfigValidator::validate_bench(&config)? {
            println!("{}", warning.format(config.enable_color));
        }

        run_benchmark(&config, &logger, &mut perf, &output)
    }
}

/// The report flow: load, chart, summarize
pub struct ReportPipeline<'a> {
    config: &'a Config,
    logger: &'a Logger,
    perf: &'a mut PerformanceLogger,
    output: OutputCoordinator,
}

impl<'a> ReportPipeline<'a> {
    pub fn new(config: &'a Config, logger: &'a Logger, perf: &'a mut PerformanceLogger) -> Self {
        Self {
            config,
            logger,
            perf,
            output: OutputCoordinator::from_flags(config.enable_color, config.verbose),
        }
    }

    /// Run the pipeline; a missing input fails before anything is written
    pub fn run(mut self) -> Result<()> {
        let correlation_id = self.logger.start_operation("report");

        match self.execute() {
            Ok(()) => {
                self.logger.end_operation(&correlation_id, "report", true);
                Ok(())
            }
            Err(e) => {
                self.logger
                    .error("Report failed")
                    .correlation_id(&correlation_id)
                    .error_info(&e)
                    .log();
                self.logger.end_operation(&correlation_id, "report", false);
                Err(e)
            }
        }
    }

    fn execute(&mut self) -> Result<()> {
        self.perf.start_timing("load");
        let dataset = self.load()?;
        self.perf.end_timing("load");

        let panels = analysis_panels(&dataset);
        for test_type in &panels.missing_baselines {
            println!(
                "{}",
                self.output.display_warning(&format!(
                    "No hay fila con 1 trabajador para {}; se omite su speedup",
                    test_type
                ))?
            );
        }

        self.perf.start_timing("charts");
        let renderer = ChartRenderer::from_config(self.config);
        let analysis_path = self.config.analysis_chart_path();
        let thread_path = self.config.thread_chart_path();

        renderer.render_analysis(&panels.panels, &analysis_path)?;
        renderer.render_single(
            &thread_time_panel(&dataset, self.config.annotate_every),
            &thread_path,
        )?;
        self.perf.end_timing("charts");
        println!("{}", self.output.display_saved_charts(&analysis_path, &thread_path)?);

        let summary = ScalabilityAnalyzer::new(&dataset).summarize();
        println!("{}", self.output.display_summary(&summary)?);

        if self.config.debug {
            self.logger
                .debug("Summary computed")
                .field("summary", &summary)
                .log();
        }

        Ok(())
    }

    fn load(&self) -> Result<Dataset> {
        let dataset = Dataset::load(&self.config.input_path)?;
        self.logger
            .info("Benchmark data loaded")
            .field("path", self.config.input_path.display().to_string())
            .field("rows", dataset.len())
            .log();
        Ok(dataset)
    }
}

/// Run the benchmark sweep, printing a line per combination, then write the CSV
pub fn run_benchmark(
    config: &BenchConfig,
    logger: &Logger,
    perf: &mut PerformanceLogger,
    output: &OutputCoordinator,
) -> Result<()> {
    println!(
        "Ejecutando {} combinaciones x {} iteraciones ({} incrementos por trabajador)",
        config.total_runs() / config.iterations.max(1) as usize,
        config.iterations,
        config.increments_per_worker
    );

    perf.start_timing("bench");
    let runner = BenchmarkRunner::new(config)?;
    let mut line_error = None;
    let records = runner.run(|record| match output.display_bench_record(record) {
        Ok(line) => println!("{}", line),
        Err(e) => line_error = Some(e),
    })?;
    if let Some(e) = line_error {
        return Err(e);
    }
    perf.end_timing("bench");

    bench::write_csv(&config.output_path, &records)?;
    logger
        .info("Benchmark data written")
        .field("path", config.output_path.display().to_string())
        .field("rows", records.len())
        .log();

    println!("\n{}", output.display_bench_results(&records, &config.output_path)?);
    Ok(())
}
