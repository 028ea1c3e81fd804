//! Loading and filtering of benchmark CSV data

use crate::error::{AppError, Result};
use crate::models::BenchmarkRecord;
use crate::types::{SyncMode, TestType};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Immutable set of benchmark rows in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<BenchmarkRecord>,
}

impl Dataset {
    /// Wrap already parsed rows
    pub fn new(records: Vec<BenchmarkRecord>) -> Self {
        Self { records }
    }

    /// Load a CSV file. A missing file is reported as `DataNotFound`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppError::data_not_found(path));
        }

        let file = File::open(path)
            .map_err(|e| AppError::io(format!("Failed to open {}: {}", path.display(), e)))?;
        Self::from_reader(file)
    }

    /// Parse rows from any reader; columns are matched by header name
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<BenchmarkRecord>, csv::Error>>()?;

        Ok(Self { records })
    }

    /// All rows
    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Synchronised rows of one concurrency kind, in file order
    pub fn synchronized(&self, test_type: &TestType) -> Vec<&BenchmarkRecord> {
        self.records
            .iter()
            .filter(|r| r.sync_type == SyncMode::Synchronized && &r.test_type == test_type)
            .collect()
    }

    /// Unsynchronised rows of any concurrency kind, in file order
    pub fn unsynchronized(&self) -> Vec<&BenchmarkRecord> {
        self.records
            .iter()
            .filter(|r| r.sync_type == SyncMode::Unsynchronized)
            .collect()
    }

    /// Largest worker count over every row
    pub fn max_workers(&self) -> Option<u32> {
        self.records.iter().map(|r| r.num_threads).max()
    }
}

impl From<Vec<BenchmarkRecord>> for Dataset {
    fn from(records: Vec<BenchmarkRecord>) -> Self {
        Self::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "sync_type,test_type,num_threads,execution_time_ms,throughput_ops_ms,cpu_utilization_percent,expected_counter,final_counter,is_correct";

    fn sample_csv() -> String {
        [
            HEADER,
            "CON_SYNC,HILOS,1,100.0,10.0,99.0,1000,1000,True",
            "CON_SYNC,PROCESOS,1,120.0,8.33,98.0,1000,1000,True",
            "CON_SYNC,HILOS,2,55.0,36.36,180.0,2000,2000,True",
            "SIN_SYNC,HILOS,4,10.0,100.0,350.0,1000,800,False",
            "SIN_SYNC,PROCESOS,8,12.0,83.3,390.0,1000,1000,True",
        ]
        .join("\n")
    }

    #[test]
    fn test_from_reader_keeps_file_order() {
        let dataset = Dataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.records()[0].execution_time_ms, 100.0);
        assert_eq!(dataset.records()[4].num_threads, 8);
    }

    #[test]
    fn test_filters() {
        let dataset = Dataset::from_reader(sample_csv().as_bytes()).unwrap();

        let threads = dataset.synchronized(&TestType::Threads);
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|r| r.test_type == TestType::Threads));

        let processes = dataset.synchronized(&TestType::Processes);
        assert_eq!(processes.len(), 1);

        let racy = dataset.unsynchronized();
        assert_eq!(racy.len(), 2);
        assert!(racy.iter().all(|r| r.sync_type == SyncMode::Unsynchronized));
    }

    #[test]
    fn test_max_workers_spans_all_rows() {
        let dataset = Dataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(dataset.max_workers(), Some(8));
        assert_eq!(Dataset::default().max_workers(), None);
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let dataset = Dataset::from_reader(HEADER.as_bytes()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_missing_file_is_data_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Dataset::load(dir.path().join("scalability_data.csv"));
        assert!(matches!(result, Err(AppError::DataNotFound(_))));
    }

    #[test]
    fn test_malformed_row_is_parse_error() {
        let text = format!("{}\nCON_SYNC,HILOS,two,1.0,1.0,1.0,1,1,True\n", HEADER);
        let result = Dataset::from_reader(text.as_bytes());
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(sample_csv().as_bytes()).unwrap();
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 5);
    }
}
