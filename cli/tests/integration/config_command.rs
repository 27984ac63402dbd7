//! Integration tests for `outline-gcp config`.
//!
//! All filesystem-touching tests set `OUTLINE_GCP_CONFIG` to a temp path so
//! they never read or write `~/.outline-gcp/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn outline_gcp() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("outline-gcp"));
    cmd.env("NO_COLOR", "1")
        .env_remove("GCP_PROJECT")
        .env_remove("GCP_ZONE");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

// ---------------------------------------------------------------------------
// `outline-gcp config show`
// ---------------------------------------------------------------------------

#[test]
fn test_config_show_without_file_uses_defaults() {
    let (_dir, path) = temp_config_path();
    outline_gcp()
        .args(["config", "show"])
        .env("OUTLINE_GCP_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("us-central1-b"))
        .stdout(predicate::str::contains("e2-small"))
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn test_config_show_does_not_create_file() {
    let (_dir, path) = temp_config_path();
    outline_gcp()
        .args(["config", "show"])
        .env("OUTLINE_GCP_CONFIG", &path)
        .assert()
        .success();
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_show_json_includes_path_and_values() {
    let (_dir, path) = temp_config_path();
    let output = outline_gcp()
        .args(["config", "show", "--json"])
        .env("OUTLINE_GCP_CONFIG", &path)
        .output()
        .expect("run");
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(doc["path"], path.as_str());
    assert_eq!(doc["config"]["gcp"]["zone"], "us-central1-b");
}

// ---------------------------------------------------------------------------
// `outline-gcp config set`
// ---------------------------------------------------------------------------

#[test]
fn test_config_set_then_show_round_trips() {
    let (_dir, path) = temp_config_path();
    outline_gcp()
        .args(["config", "set", "gcp.project", "my-project"])
        .env("OUTLINE_GCP_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Set gcp.project = my-project"));

    outline_gcp()
        .args(["config", "show"])
        .env("OUTLINE_GCP_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("my-project"));
}

#[test]
fn test_config_set_persists_yaml() {
    let (_dir, path) = temp_config_path();
    outline_gcp()
        .args(["config", "set", "gcp.zone", "europe-west4-a"])
        .env("OUTLINE_GCP_CONFIG", &path)
        .assert()
        .success();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("europe-west4-a"));
}

#[test]
fn test_config_set_invalid_value_is_rejected() {
    let (_dir, path) = temp_config_path();
    outline_gcp()
        .args(["config", "set", "install.poll_interval_secs", "0"])
        .env("OUTLINE_GCP_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive number of seconds"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_unknown_key_is_rejected() {
    let (_dir, path) = temp_config_path();
    outline_gcp()
        .args(["config", "set", "gcp.region", "us-east1"])
        .env("OUTLINE_GCP_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"));
}
