//! Configuration file tests

use super::run_subpool;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Should create temp config file");
    write!(file, "{}", contents).expect("Should write temp config file");
    file
}

#[test]
fn test_config_file_values_are_used() {
    let file = config_file(
        r#"
        url = "memory://from-config"
        subject = "config.jobs"
        pool-size = 2
        queue-capacity = 3
        log-level = "off"
        "#,
    );
    let path = file.path().to_string_lossy().to_string();

    let output = run_subpool(&["--config-file", &path, "--drain", "--messages", "7"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("published 7 messages, handled 7"));
}

#[test]
fn test_cli_overrides_config_file() {
    let file = config_file("url = \"nats://not-supported\"\nlog-level = \"off\"\n");
    let path = file.path().to_string_lossy().to_string();

    let output = run_subpool(&[
        "--config-file",
        &path,
        "--url",
        "memory://override",
        "--drain",
        "--messages",
        "1",
    ]);

    assert!(output.status.success());
}

#[test]
fn test_unknown_config_key_fails() {
    let file = config_file("workers = 4\n");
    let path = file.path().to_string_lossy().to_string();

    let output = run_subpool(&["--config-file", &path, "--drain"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error parsing configuration file"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let output = run_subpool(&[
        "--config-file",
        &missing.to_string_lossy(),
        "--drain",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}
