//! Binary behaviour tests

use super::run_subpool;

#[test]
fn test_drain_run_handles_every_message() {
    let output = run_subpool(&[
        "--drain",
        "--messages",
        "25",
        "--pool-size",
        "3",
        "--queue-capacity",
        "4",
        "--log-level",
        "off",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(
        stdout.contains("published 25 messages, handled 25"),
        "unexpected stdout: {}",
        stdout
    );
}

#[test]
fn test_drain_with_zero_messages() {
    let output = run_subpool(&["--drain", "--messages", "0", "--log-level", "off"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("published 0 messages, handled 0"));
}

#[test]
fn test_unsupported_url_fails() {
    let output = run_subpool(&["--drain", "--url", "nats://localhost:4222"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("memory://"));
}

#[test]
fn test_zero_pool_size_fails() {
    let output = run_subpool(&["--drain", "--pool-size", "0", "--no-color"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("pool size must be at least 1"));
}

#[test]
fn test_wildcard_publish_subject_fails() {
    let output = run_subpool(&["--drain", "--subject", "jobs.*", "--no-color"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_version_includes_package_version() {
    let output = run_subpool(&["--version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_json_log_lines_are_json() {
    let output = run_subpool(&[
        "--drain",
        "--messages",
        "2",
        "--log-level",
        "info",
        "--log-format",
        "json",
    ]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().filter(|line| !line.is_empty()).collect();
    assert!(!lines.is_empty(), "expected some log output");
    for line in lines {
        assert!(
            serde_json::from_str::<serde_json::Value>(line).is_ok(),
            "not a JSON log line: {}",
            line
        );
    }
}
