//! Benchmark observation rows as stored in `scalability_data.csv`

use crate::types::{SyncMode, TestType};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One benchmark observation. Column names match the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub sync_type: SyncMode,
    pub test_type: TestType,
    /// Worker count (threads or processes, despite the column name)
    pub num_threads: u32,
    pub execution_time_ms: f64,
    pub throughput_ops_ms: f64,
    pub cpu_utilization_percent: f64,
    pub expected_counter: u64,
    pub final_counter: u64,
    #[serde(deserialize_with = "deserialize_flag", serialize_with = "serialize_flag")]
    pub is_correct: bool,
}

impl BenchmarkRecord {
    /// Build a row from raw measurements, deriving throughput and correctness
    pub fn from_measurement(
        test_type: TestType,
        sync_type: SyncMode,
        workers: u32,
        execution_time_ms: f64,
        cpu_utilization_percent: f64,
        expected_counter: u64,
        final_counter: u64,
    ) -> Self {
        let throughput_ops_ms = if execution_time_ms > 0.0 {
            expected_counter as f64 / execution_time_ms
        } else {
            0.0
        };

        Self {
            sync_type,
            test_type,
            num_threads: workers,
            execution_time_ms,
            throughput_ops_ms,
            cpu_utilization_percent,
            expected_counter,
            final_counter,
            is_correct: final_counter == expected_counter,
        }
    }

    /// Percentage of increments lost relative to the expected counter.
    ///
    /// `None` when the expected counter is zero.
    pub fn data_loss_percent(&self) -> Option<f64> {
        if self.expected_counter == 0 {
            return None;
        }
        let expected = self.expected_counter as f64;
        Some((expected - self.final_counter as f64) / expected * 100.0)
    }
}

/// Accepts the spellings pandas and shell harnesses produce
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "si" | "sí" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid is_correct value: {}", other))),
    }
}

fn serialize_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "True" } else { "False" })
}
