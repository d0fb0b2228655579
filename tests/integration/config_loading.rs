use fundsync::infrastructure::config::load_config;
use fundsync::SyncError;
use std::path::Path;

#[test]
fn missing_file_yields_defaults() {
    let config = load_config(Path::new("/nonexistent/fundsync.toml")).unwrap();
    assert_eq!(config.sync.node_rpc_url, "http://127.0.0.1:8545");
    assert_eq!(config.sync.poll_interval_seconds, 4);
    assert_eq!(config.sync.max_query_window, 2000);
    assert_eq!(config.sync.match_window_seconds, 180);
    assert_eq!(config.sync.orphan_retry_cycles, 3);
    assert_eq!(config.logging.filters, "info");
    assert!(config.logging.log_dir.is_none());
}

#[test]
fn toml_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fundsync.toml");
    std::fs::write(
        &path,
        r#"
[sync]
node_rpc_url = "http://10.0.0.7:8545"
poll_interval_seconds = 2
max_query_window = 500

[logging]
filters = "fundsync=debug"
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.sync.node_rpc_url, "http://10.0.0.7:8545");
    assert_eq!(config.sync.poll_interval_seconds, 2);
    assert_eq!(config.sync.max_query_window, 500);
    // Unset keys keep their defaults.
    assert_eq!(config.sync.match_window_seconds, 180);
    assert_eq!(config.logging.filters, "fundsync=debug");
}

#[test]
fn invalid_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fundsync.toml");
    std::fs::write(&path, "[sync]\npoll_interval_seconds = 0\n").unwrap();

    assert!(matches!(load_config(&path), Err(SyncError::ConfigError(_))));
}
