//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Concurrency kind of a benchmark run (`test_type` column)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TestType {
    /// Forked worker processes sharing a mapped counter
    Processes,
    /// Worker threads inside one process
    Threads,
    /// Any tag the harness wrote that this tool does not know
    Other(String),
}

impl TestType {
    pub const PROCESSES_TAG: &'static str = "PROCESOS";
    pub const THREADS_TAG: &'static str = "HILOS";

    /// Tag as written in the CSV
    pub fn tag(&self) -> &str {
        match self {
            TestType::Processes => Self::PROCESSES_TAG,
            TestType::Threads => Self::THREADS_TAG,
            TestType::Other(tag) => tag,
        }
    }

    /// Plural worker noun used in the console summary
    pub fn worker_noun(&self) -> &'static str {
        match self {
            TestType::Processes => "procesos",
            TestType::Threads => "hilos",
            TestType::Other(_) => "trabajadores",
        }
    }

    /// Legend label used in charts
    pub fn label(&self) -> &str {
        match self {
            TestType::Processes => "Procesos",
            TestType::Threads => "Hilos",
            TestType::Other(tag) => tag,
        }
    }
}

impl From<String> for TestType {
    fn from(value: String) -> Self {
        match value.trim() {
            Self::PROCESSES_TAG => TestType::Processes,
            Self::THREADS_TAG => TestType::Threads,
            other => TestType::Other(other.to_string()),
        }
    }
}

impl From<TestType> for String {
    fn from(value: TestType) -> Self {
        value.tag().to_string()
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Synchronisation mode of a benchmark run (`sync_type` column)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SyncMode {
    /// Increments guarded by a lock
    Synchronized,
    /// Racy read-modify-write increments
    Unsynchronized,
    /// Any tag the harness wrote that this tool does not know
    Other(String),
}

impl SyncMode {
    pub const SYNC_TAG: &'static str = "CON_SYNC";
    pub const NO_SYNC_TAG: &'static str = "SIN_SYNC";

    /// Tag as written in the CSV
    pub fn tag(&self) -> &str {
        match self {
            SyncMode::Synchronized => Self::SYNC_TAG,
            SyncMode::Unsynchronized => Self::NO_SYNC_TAG,
            SyncMode::Other(tag) => tag,
        }
    }

    pub fn is_synchronized(&self) -> bool {
        matches!(self, SyncMode::Synchronized)
    }
}

impl From<String> for SyncMode {
    fn from(value: String) -> Self {
        match value.trim() {
            Self::SYNC_TAG => SyncMode::Synchronized,
            Self::NO_SYNC_TAG => SyncMode::Unsynchronized,
            other => SyncMode::Other(other.to_string()),
        }
    }
}

impl From<SyncMode> for String {
    fn from(value: SyncMode) -> Self {
        value.tag().to_string()
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Image format for rendered charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    /// Raster output through the bitmap backend
    Png,
    /// Vector output; keeps text labels as SVG text elements
    Svg,
}

impl ChartFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

impl FromStr for ChartFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ChartFormat::Png),
            "svg" => Ok(ChartFormat::Svg),
            _ => Err(AppError::parse(format!("Invalid chart format: {} (expected png or svg)", s))),
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
