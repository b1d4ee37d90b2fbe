//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a temporary directory
//! so every test gets its own config and database.

use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_sitetime"))
        .args(args)
        .env("HOME", home)
        .env_remove("SITETIME_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_status_of_unknown_site_is_default() {
    let home = tempfile::tempdir().unwrap();
    let status = run_json(home.path(), &["timer", "status", "example.com"]);
    assert_eq!(status["type"], "StateSnapshot");
    assert_eq!(status["origin"], "example.com");
    assert_eq!(status["elapsed_ms"], 0);
    assert_eq!(status["display"], "00:00:00");
    assert_eq!(status["state"], "paused");
}

#[test]
fn test_run_persists_elapsed_time() {
    let home = tempfile::tempdir().unwrap();
    let snapshot = run_json(
        home.path(),
        &["timer", "run", "https://example.com/page", "--seconds", "1"],
    );
    assert_eq!(snapshot["origin"], "example.com");
    assert_eq!(snapshot["elapsed_ms"], 1000);

    let status = run_json(home.path(), &["timer", "status", "example.com"]);
    assert_eq!(status["elapsed_ms"], 1000);

    let list = run_json(home.path(), &["timer", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, _, code) = run_cli(home.path(), &["timer", "reset", "example.com"]);
    assert_eq!(code, 0);
    let status = run_json(home.path(), &["timer", "status", "example.com"]);
    assert_eq!(status["elapsed_ms"], 0);
}

#[test]
fn test_reset_all_clears_list() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["timer", "run", "a.com", "--seconds", "0"]);
    run_json(home.path(), &["timer", "run", "b.com", "--seconds", "0"]);
    assert_eq!(
        run_json(home.path(), &["timer", "list"]).as_array().unwrap().len(),
        2
    );

    let (_, _, code) = run_cli(home.path(), &["timer", "reset-all"]);
    assert_eq!(code, 0);
    assert!(run_json(home.path(), &["timer", "list"])
        .as_array()
        .unwrap()
        .is_empty());
}

#[test]
fn test_invalid_origin_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["timer", "status", "file:///etc/hosts"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid origin"));
}

#[test]
fn test_config_get_and_rules_list() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "indicator.running_color"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "#1a5fb4");

    let (stdout, _, code) = run_cli(home.path(), &["config", "path"]);
    assert_eq!(code, 0);
    let path = stdout.trim().to_string();
    std::fs::write(
        &path,
        "[rules.\"twitter.com\"]\nthreshold_minutes = 10\n",
    )
    .unwrap();

    let rules = run_json(home.path(), &["rules", "list"]);
    assert_eq!(rules[0]["origin"], "twitter.com");
    assert_eq!(rules[0]["threshold_ms"], 600_000);
    assert_eq!(rules[0]["action"], "timeout");

    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "indicator.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[cfg(unix)]
#[test]
fn test_interrupted_run_keeps_elapsed_time() {
    let home = tempfile::tempdir().unwrap();
    let child = Command::new(env!("CARGO_BIN_EXE_sitetime"))
        .args(["timer", "run", "example.com", "--seconds", "10"])
        .env("HOME", home.path())
        .env_remove("SITETIME_ENV")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn CLI");

    std::thread::sleep(std::time::Duration::from_millis(3500));
    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("Failed to send SIGINT");
    assert!(status.success());

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    assert_eq!(output.status.code(), Some(0));
    let snapshot: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Failed to parse JSON output");
    let elapsed = snapshot["elapsed_ms"].as_u64().unwrap();
    assert!((2000..10_000).contains(&elapsed), "elapsed_ms = {elapsed}");

    let stored = run_json(home.path(), &["timer", "status", "example.com"]);
    assert_eq!(stored["elapsed_ms"].as_u64(), Some(elapsed));
}

#[test]
fn test_broken_config_stops_run() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "path"]);
    assert_eq!(code, 0);
    std::fs::write(stdout.trim(), "[rules.\"twitter.com\"\nthreshold_minutes = ").unwrap();

    let (_, stderr, code) = run_cli(home.path(), &["timer", "run", "twitter.com", "--seconds", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "stderr = {stderr}");
}
