//! Data models and structures for the scalability analyzer

pub mod config;
pub mod record;

// Re-export main model types
pub use config::{BenchConfig, Config};
pub use record::BenchmarkRecord;
