//! End-to-end tests of the `bench` command and its hand-off to `report`

use assert_cmd::prelude::*;
use predicates::prelude::*;
use scalability_analyzer::{Dataset, SyncMode, TestType};
use std::process::Command;
use tempfile::TempDir;

fn create_test_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scalab").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SCALABILITY_DATA")
        .env_remove("OUTPUT_DIR")
        .env_remove("CHART_FORMAT")
        .env_remove("BENCH_WORKERS")
        .env_remove("BENCH_INCREMENTS")
        .env_remove("BENCH_ITERATIONS")
        .env_remove("BENCH_OUTPUT")
        .arg("--no-color");
    cmd
}

#[test]
fn test_thread_bench_writes_csv() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .args(["bench", "--threads-only", "--workers", "1,2", "--increments", "5000", "--iterations", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HILOS CON_SYNC con 1 hilos"))
        .stdout(predicate::str::contains("=== RESULTADOS DEL BENCHMARK ==="))
        .stdout(predicate::str::contains("✓ Datos guardados en: scalability_data.csv"));

    let dataset = Dataset::load(dir.path().join("scalability_data.csv")).unwrap();
    assert_eq!(dataset.len(), 4);
    assert!(dataset.records().iter().all(|r| r.test_type == TestType::Threads));
    for record in dataset.records() {
        assert_eq!(record.expected_counter, u64::from(record.num_threads) * 5000);
        assert!(record.final_counter <= record.expected_counter);
        if record.sync_type == SyncMode::Synchronized {
            assert!(record.is_correct);
        }
    }
}

#[test]
fn test_synchronized_process_bench_is_exact() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .args([
            "bench",
            "--processes-only",
            "--sync-only",
            "--workers",
            "1,3",
            "--increments",
            "20000",
            "--iterations",
            "2",
            "--output",
            "out/procs.csv",
        ])
        .assert()
        .success();

    let dataset = Dataset::load(dir.path().join("out").join("procs.csv")).unwrap();
    assert_eq!(dataset.len(), 2);
    for record in dataset.records() {
        assert_eq!(record.test_type, TestType::Processes);
        assert_eq!(record.sync_type, SyncMode::Synchronized);
        assert_eq!(record.final_counter, record.expected_counter);
        assert!(record.is_correct);
    }
}

#[test]
fn test_unsynchronized_process_bench_never_overcounts() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .args([
            "bench",
            "--processes-only",
            "--no-sync-only",
            "--workers",
            "2",
            "--increments",
            "50000",
            "--iterations",
            "1",
        ])
        .assert()
        .success();

    let dataset = Dataset::load(dir.path().join("scalability_data.csv")).unwrap();
    let record = &dataset.records()[0];
    assert_eq!(record.expected_counter, 100_000);
    assert!(record.final_counter <= record.expected_counter);
    assert!(record.final_counter > 0);
}

#[test]
fn test_bench_output_feeds_report() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .args(["bench", "--max-workers", "2", "--increments", "2000", "--iterations", "1"])
        .assert()
        .success();

    create_test_cmd(&dir)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("HILOS:"))
        .stdout(predicate::str::contains("PROCESOS:"))
        .stdout(predicate::str::contains("RACE CONDITIONS DETECTADAS:"));

    assert!(dir.path().join("scalability_analysis.png").exists());
    assert!(dir.path().join("tiempo_vs_hilos.png").exists());
}

#[test]
fn test_shared_counter_files_are_removed() {
    let dir = TempDir::new().unwrap();
    let tmp = dir.path().join("tmp");
    std::fs::create_dir(&tmp).unwrap();

    create_test_cmd(&dir)
        .env("TMPDIR", &tmp)
        .args(["bench", "--processes-only", "--workers", "2", "--increments", "1000", "--iterations", "1"])
        .assert()
        .success();

    let leftovers: Vec<_> = std::fs::read_dir(&tmp)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("scalab-shm-"))
        .collect();
    assert!(leftovers.is_empty());
}
