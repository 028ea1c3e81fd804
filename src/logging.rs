//! Diagnostic logging for the report and bench commands
//!
//! Entries go to stderr so they never mix with the report printed on
//! stdout. `--verbose` shows info entries as text, `--debug` switches to
//! one JSON object per line with source locations.

use crate::error::AppError;
use crate::models::{BenchConfig, BenchmarkRecord, Config};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Instant;
use uuid::Uuid;

/// Severity of a diagnostic entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Lowest level shown for the given verbosity flags
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        match (verbose, debug) {
            (_, true) => LogLevel::Debug,
            (true, false) => LogLevel::Info,
            (false, false) => LogLevel::Warn,
        }
    }

    fn label(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn painted(self) -> String {
        let label = format!("{:>5}", self.label());
        match self {
            LogLevel::Debug => label.cyan().to_string(),
            LogLevel::Info => label.green().to_string(),
            LogLevel::Warn => label.yellow().to_string(),
            LogLevel::Error => label.red().bold().to_string(),
        }
    }
}

/// One rendered diagnostic
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub logger: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub fields: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LogLocation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: String,
}

/// Named logger writing text or JSON lines to stderr
pub struct Logger {
    name: String,
    threshold: LogLevel,
    json: bool,
    use_color: bool,
    session_id: Option<String>,
    // Set between start_operation and end_operation
    operation: Mutex<Option<String>>,
}

impl Logger {
    /// Create a logger from the global verbosity and color flags
    pub fn with_flags(name: &str, verbose: bool, debug: bool, use_color: bool) -> Self {
        Self {
            name: name.to_string(),
            threshold: LogLevel::from_flags(verbose, debug),
            json: debug,
            use_color,
            session_id: None,
            operation: Mutex::new(None),
        }
    }

    /// Tag every entry of this logger with a session id
    pub fn in_session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    /// Open an operation; entries logged until it ends carry its id
    pub fn start_operation(&self, operation: &str) -> String {
        let id = Uuid::new_v4().to_string();
        if let Ok(mut current) = self.operation.lock() {
            *current = Some(id.clone());
        }

        self.debug(&format!("{} started", operation))
            .field("operation", operation)
            .log();
        id
    }

    /// Close an operation opened by `start_operation`
    pub fn end_operation(&self, id: &str, operation: &str, success: bool) {
        self.debug(&format!("{} finished", operation))
            .correlation_id(id)
            .field("operation", operation)
            .field("success", success)
            .log();

        if let Ok(mut current) = self.operation.lock() {
            if current.as_deref() == Some(id) {
                *current = None;
            }
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder {
            logger: self,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                logger: self.name.clone(),
                message: message.to_string(),
                correlation_id: None,
                fields: BTreeMap::new(),
                location: None,
            },
        }
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    fn render(&self, mut entry: LogEntry) -> Option<String> {
        if entry.level < self.threshold {
            return None;
        }

        if entry.correlation_id.is_none() {
            entry.correlation_id = self.operation.lock().ok().and_then(|current| current.clone());
        }
        if let Some(session_id) = &self.session_id {
            entry
                .fields
                .insert("session_id".to_string(), serde_json::Value::from(session_id.as_str()));
        }

        if self.json {
            Some(
                serde_json::to_string(&entry)
                    .unwrap_or_else(|e| format!("{{\"message\":\"unserializable entry: {}\"}}", e)),
            )
        } else {
            Some(self.render_text(&entry))
        }
    }

    fn render_text(&self, entry: &LogEntry) -> String {
        let level = if self.use_color {
            entry.level.painted()
        } else {
            format!("{:>5}", entry.level.label())
        };

        let mut line = format!(
            "{} {} [{}] {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            level,
            entry.logger,
            entry.message
        );

        if let Some(id) = &entry.correlation_id {
            line.push_str(&format!(" ({})", &id[..id.len().min(8)]));
        }

        let fields: Vec<String> = entry
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != "session_id")
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        if !fields.is_empty() {
            line.push(' ');
            line.push_str(&fields.join(" "));
        }

        line
    }

    fn emit(&self, entry: LogEntry) {
        if let Some(line) = self.render(entry) {
            let mut stderr = io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// Accumulates fields for one entry before it is written
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32, module: &str) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.to_string(),
        });
        self
    }

    /// Attach the measured columns of a benchmark row
    pub fn record(self, record: &BenchmarkRecord) -> Self {
        self.field("test_type", record.test_type.tag())
            .field("sync_type", record.sync_type.tag())
            .field("workers", record.num_threads)
            .field("execution_time_ms", record.execution_time_ms)
            .field("cpu_utilization_percent", record.cpu_utilization_percent)
            .field("final_counter", record.final_counter)
            .field("is_correct", record.is_correct)
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("exit_code", error.exit_code())
    }

    pub fn log(self) {
        self.logger.emit(self.entry);
    }

    /// The line `log` would write, or `None` below the threshold
    pub fn render(self) -> Option<String> {
        self.logger.render(self.entry)
    }
}

/// Wall-clock timing of named stages
pub struct PerformanceLogger {
    logger: Logger,
    started: HashMap<String, Instant>,
}

impl PerformanceLogger {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            started: HashMap::new(),
        }
    }

    pub fn start_timing(&mut self, stage: &str) {
        self.started.insert(stage.to_string(), Instant::now());
    }

    /// Log and return the elapsed time of a started stage
    pub fn end_timing(&mut self, stage: &str) -> Option<std::time::Duration> {
        let elapsed = self.started.remove(stage)?.elapsed();
        self.logger
            .info(&format!("{} took {:.1} ms", stage, elapsed.as_secs_f64() * 1000.0))
            .field("stage", stage)
            .field("duration_ms", elapsed.as_millis() as u64)
            .log();
        Some(elapsed)
    }
}

/// Per-run and per-worker diagnostics of the benchmark sweep
pub struct BenchLogger {
    logger: Logger,
}

impl BenchLogger {
    pub fn new(config: &BenchConfig) -> Self {
        Self {
            logger: Logger::with_flags("BENCH", config.verbose, config.debug, config.enable_color),
        }
    }

    pub fn log_run_start(&self, test_type: &str, sync_type: &str, workers: u32, iteration: u32) {
        self.logger
            .debug(&format!("{} {} x{} iteration {}", test_type, sync_type, workers, iteration))
            .field("iteration", iteration)
            .log();
    }

    /// Synchronized rows that lost increments are logged as warnings
    pub fn log_record(&self, record: &BenchmarkRecord) {
        let level = if record.is_correct || !record.sync_type.is_synchronized() {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        self.logger
            .log(
                level,
                &format!(
                    "{} {} x{}: {}/{} increments",
                    record.test_type, record.sync_type, record.num_threads, record.final_counter, record.expected_counter
                ),
            )
            .record(record)
            .log();
    }

    pub fn log_worker(&self, worker_id: u32, pid: u32, event: &str) {
        self.logger
            .debug(&format!("worker {} {}", worker_id, event))
            .field("pid", pid)
            .log();
    }
}

/// Hands out loggers that share one session id
pub struct LoggerFactory {
    verbose: bool,
    debug: bool,
    use_color: bool,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: &Config) -> Self {
        Self::from_flags(config.verbose, config.debug, config.enable_color)
    }

    pub fn from_flags(verbose: bool, debug: bool, use_color: bool) -> Self {
        Self {
            verbose,
            debug,
            use_color,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn create_logger(&self, name: &str) -> Logger {
        Logger::with_flags(name, self.verbose, self.debug, self.use_color).in_session(&self.session_id)
    }

    pub fn create_performance_logger(&self) -> PerformanceLogger {
        PerformanceLogger::new(self.create_logger("PERF"))
    }
}

/// Debug entry tagged with the call site
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger
            .debug(&format!($($arg)*))
            .location(file!(), line!(), module_path!())
            .log()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SyncMode, TestType};

    fn json(line: Option<String>) -> serde_json::Value {
        serde_json::from_str(&line.unwrap()).unwrap()
    }

    #[test]
    fn test_level_from_flags() {
        assert_eq!(LogLevel::from_flags(false, false), LogLevel::Warn);
        assert_eq!(LogLevel::from_flags(true, false), LogLevel::Info);
        assert_eq!(LogLevel::from_flags(false, true), LogLevel::Debug);
        assert_eq!(LogLevel::from_flags(true, true), LogLevel::Debug);
    }

    #[test]
    fn test_quiet_logger_keeps_only_warnings() {
        let logger = Logger::with_flags("TEST", false, false, false);
        assert!(logger.debug("hidden").render().is_none());
        assert!(logger.info("hidden").render().is_none());
        assert!(logger.warn("shown").render().is_some());
        assert!(logger.error("shown").render().is_some());
    }

    #[test]
    fn test_verbose_text_line() {
        let logger = Logger::with_flags("REPORT", true, false, false);
        let line = logger.info("loaded").field("rows", 12).field("path", "a.csv").render().unwrap();

        assert!(line.contains(" INFO [REPORT] loaded"));
        assert!(line.ends_with("path=\"a.csv\" rows=12"));
        assert!(!line.contains('\u{1b}'));
    }

    #[test]
    fn test_debug_logger_writes_json_with_location() {
        let logger = Logger::with_flags("REPORT", false, true, false);
        let value = json(
            logger
                .debug("panels built")
                .location("src/app.rs", 10, "scalability_analyzer::app")
                .field("panels", 4)
                .render(),
        );

        assert_eq!(value["level"], "DEBUG");
        assert_eq!(value["message"], "panels built");
        assert_eq!(value["fields"]["panels"], 4);
        assert_eq!(value["location"]["line"], 10);
    }

    #[test]
    fn test_operation_id_applies_until_closed() {
        let logger = Logger::with_flags("REPORT", false, true, false);

        let id = logger.start_operation("report");
        assert_eq!(json(logger.info("inside").render())["correlation_id"], id.as_str());

        logger.end_operation(&id, "report", true);
        assert!(json(logger.info("outside").render()).get("correlation_id").is_none());
    }

    #[test]
    fn test_factory_loggers_share_session() {
        let factory = LoggerFactory::from_flags(false, true, false);
        let a = json(factory.create_logger("A").info("a").render());
        let b = json(factory.create_logger("B").info("b").render());

        assert!(a["fields"]["session_id"].is_string());
        assert_eq!(a["fields"]["session_id"], b["fields"]["session_id"]);
    }

    #[test]
    fn test_end_timing_requires_start() {
        let factory = LoggerFactory::from_flags(false, false, false);
        let mut perf = factory.create_performance_logger();

        assert!(perf.end_timing("charts").is_none());
        perf.start_timing("charts");
        assert!(perf.end_timing("charts").is_some());
        assert!(perf.end_timing("charts").is_none());
    }

    #[test]
    fn test_record_and_error_fields() {
        let logger = Logger::with_flags("BENCH", false, true, false);
        let record = BenchmarkRecord::from_measurement(
            TestType::Threads, SyncMode::Synchronized, 2, 10.0, 150.0, 200, 200,
        );
        let value = json(
            logger
                .error("run failed")
                .record(&record)
                .error_info(&AppError::benchmark("worker died"))
                .render(),
        );

        assert_eq!(value["fields"]["test_type"], "HILOS");
        assert_eq!(value["fields"]["workers"], 2);
        assert_eq!(value["fields"]["is_correct"], true);
        assert_eq!(value["fields"]["exit_code"], 6);
    }
}
