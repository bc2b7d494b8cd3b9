#![allow(clippy::unwrap_used, clippy::expect_used)]

use nova4d_core::config::NovaConfig;
use nova4d_core::errors::NovaError;
use nova4d_core::logging_facility::Profile;
use nova4d_core::policy::{normalize_safety_policy, SafetyMode};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nova4d.toml");
    fs::write(
        &path,
        r#"
[queue]
lease_ms = 5000
dispatch_limit = 5

[headless]
max_jobs = 50
keep_jobs = 10

[safety]
mode = "strict"
allow_dangerous = true

[logging]
profile = "production"
"#,
    )
    .unwrap();

    let config = NovaConfig::load(&path).unwrap();
    assert_eq!(config.queue.lease_ms, 5000);
    assert_eq!(config.queue.dispatch_limit, 5);
    assert_eq!(config.queue.max_retention, 10_000);
    assert_eq!(config.headless.max_jobs, 50);
    assert_eq!(config.planner.default_max_commands, 20);
    assert_eq!(config.logging.profile, Profile::Production);

    let policy = normalize_safety_policy(&config.safety);
    assert_eq!(policy.mode, SafetyMode::Strict);
    assert!(policy.allow_dangerous);
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = NovaConfig::load(temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, NovaError::Io { .. }));
}

#[test]
fn test_round_trip_through_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nova4d.toml");

    let mut config = NovaConfig::default();
    config.planner.default_max_commands = 7;
    fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    assert_eq!(NovaConfig::load(&path).unwrap(), config);
}

#[test]
fn test_out_of_range_dispatch_limit_rejected() {
    let err = NovaConfig::from_toml_str("[queue]\ndispatch_limit = 0\n").unwrap_err();
    assert!(matches!(err, NovaError::InvalidConfig { .. }));
}
