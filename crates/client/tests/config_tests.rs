//! Tests for loading cluster files from disk

#![allow(clippy::unwrap_used, clippy::expect_used)]

use coordination_client::{ClusterConfig, Error, TargetAddress};
use tempfile::TempDir;

const CLUSTER: &str = r#"
[jobs]
chief = ["localhost:2222"]
worker = ["localhost:2223", "grpcs://worker-1.example.com:443"]

[channel]
connectTimeoutSecs = 3
keepAliveIntervalSecs = 15
"#;

fn write_cluster(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("cluster.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_cluster_file() {
    let dir = TempDir::new().unwrap();
    let path = write_cluster(&dir, CLUSTER);

    let config = ClusterConfig::load(&path).unwrap();

    assert_eq!(config.jobs.len(), 2);
    assert_eq!(config.channel.connect_timeout_secs, 3);
    assert_eq!(config.channel.keep_alive_interval_secs, 15);
    assert_eq!(config.channel.request_timeout_secs, 600);
    assert_eq!(
        config
            .resolve(&TargetAddress::new("/job:worker/replica:0/task:1").unwrap())
            .unwrap(),
        "grpcs://worker-1.example.com:443"
    );
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = ClusterConfig::load(&path).unwrap_err();

    match err {
        Error::Io {
            ref operation,
            ref path,
            ..
        } => {
            assert_eq!(operation, "read");
            assert!(path.ends_with("absent.toml"));
        }
        other => panic!("expected I/O error, got {other:?}"),
    }
}

#[test]
fn test_load_invalid_toml_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = write_cluster(&dir, "[jobs]\nworker = [\"localhost:2223\"");

    let err = ClusterConfig::load(&path).unwrap_err();

    assert!(matches!(err, Error::Configuration { .. }), "{err:?}");
    assert!(!err.is_connection());
}

#[test]
fn test_load_rejects_empty_endpoint() {
    let dir = TempDir::new().unwrap();
    let path = write_cluster(&dir, "[jobs]\nps = [\"\"]\n");

    let err = ClusterConfig::load(&path).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Cluster configuration error: job 'ps' has an empty endpoint for task 0"
    );
}
