//! End-to-end tests for the coordctl binary

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const CLUSTER: &str = r#"
[jobs]
chief = ["localhost:2222"]
worker = ["localhost:2223", "grpcs://worker-1.example.com:443"]
"#;

fn cluster_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cluster.toml");
    std::fs::write(&path, CLUSTER).unwrap();
    (dir, path)
}

fn coordctl() -> Command {
    let mut cmd = Command::cargo_bin("coordctl").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("COORDCTL_CLUSTER");
    cmd
}

#[test]
fn test_resolve_prints_endpoints() {
    let (_dir, path) = cluster_file();

    coordctl()
        .arg("--cluster")
        .arg(&path)
        .args(["resolve", "/job:chief/task:0", "/job:worker/replica:0/task:1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/job:chief/task:0 -> localhost:2222"))
        .stdout(predicate::str::contains(
            "/job:worker/replica:0/task:1 -> grpcs://worker-1.example.com:443",
        ));
}

#[test]
fn test_cluster_from_environment() {
    let (_dir, path) = cluster_file();

    coordctl()
        .env("COORDCTL_CLUSTER", &path)
        .args(["resolve", "/job:worker/task:0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("localhost:2223"));
}

#[test]
fn test_resolve_unknown_task_fails() {
    let (_dir, path) = cluster_file();

    coordctl()
        .arg("--cluster")
        .arg(&path)
        .args(["resolve", "/job:worker/task:5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("coordination::connection"));
}

#[test]
fn test_missing_cluster_file_fails() {
    let dir = TempDir::new().unwrap();

    coordctl()
        .arg("--cluster")
        .arg(dir.path().join("absent.toml"))
        .args(["resolve", "/job:chief/task:0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("coordination::io"));
}

#[test]
fn test_log_filter_is_applied() {
    let (_dir, path) = cluster_file();

    coordctl()
        .arg("--cluster")
        .arg(&path)
        .args(["--log-filter", "coordination_client=loud"])
        .args(["resolve", "/job:chief/task:0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tracing filter"));

    coordctl()
        .arg("--cluster")
        .arg(&path)
        .args(["--log-filter", "coordination_client=debug"])
        .args(["resolve", "/job:chief/task:0"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded cluster file"));
}
