//! Integration tests for the CLI surface: help, version, and the checks that
//! run before any provider call.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with colors off and no ambient Google Cloud settings, reading
/// config from an empty temp dir.
fn outline_gcp(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("outline-gcp"));
    cmd.env("NO_COLOR", "1")
        .env("OUTLINE_GCP_CONFIG", dir.path().join("config.yaml"))
        .env_remove("GCP_PROJECT")
        .env_remove("GCP_ZONE")
        .env_remove("GCP_ACCESS_TOKEN");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    let dir = TempDir::new().expect("temp dir");
    outline_gcp(&dir).assert().code(2).stderr(predicate::str::contains(
        "Provision and track Outline servers on Google Compute Engine",
    ));
}

#[test]
fn test_cli_help_flag_lists_commands() {
    let dir = TempDir::new().expect("temp dir");
    outline_gcp(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("wait"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    let dir = TempDir::new().expect("temp dir");
    outline_gcp(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("outline-gcp"));
}

#[test]
fn test_version_command_shows_version() {
    let dir = TempDir::new().expect("temp dir");
    outline_gcp(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("outline-gcp 0.1.0"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let dir = TempDir::new().expect("temp dir");
    let output = outline_gcp(&dir)
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(doc["version"], "0.1.0");
}

// --- Color handling ---

#[test]
fn test_no_color_env_accepts_any_non_empty_value() {
    let dir = TempDir::new().expect("temp dir");
    for value in ["1", "yes", "true"] {
        outline_gcp(&dir)
            .env("NO_COLOR", value)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\u{1b}[").not());
    }
}

#[test]
fn test_no_color_flag_and_falsey_env_are_accepted() {
    let dir = TempDir::new().expect("temp dir");
    outline_gcp(&dir)
        .env("NO_COLOR", "0")
        .args(["--no-color", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("outline-gcp 0.1.0"));
}

// --- Checks before provider calls ---

#[test]
fn test_list_without_project_explains_how_to_set_one() {
    let dir = TempDir::new().expect("temp dir");
    outline_gcp(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Google Cloud project configured"))
        .stderr(predicate::str::contains("gcp.project"));
}

#[test]
fn test_create_without_token_mentions_gcloud() {
    let dir = TempDir::new().expect("temp dir");
    outline_gcp(&dir)
        .args(["create", "outline-1", "--project", "my-project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no access token"))
        .stderr(predicate::str::contains("gcloud auth print-access-token"));
}

#[test]
fn test_create_rejects_invalid_name_before_calling_provider() {
    let dir = TempDir::new().expect("temp dir");
    outline_gcp(&dir)
        .args(["create", "Bad_Name", "--project", "my-project"])
        .env("GCP_ACCESS_TOKEN", "token")
        .env("OUTLINE_GCP_COMPUTE_URL", "http://127.0.0.1:9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid server name"));
}

#[test]
fn test_invalid_project_flag_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    outline_gcp(&dir)
        .args(["list", "--project", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --project"));
}

#[test]
fn test_json_errors_are_structured() {
    let dir = TempDir::new().expect("temp dir");
    let output = outline_gcp(&dir)
        .args(["list", "--json"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stderr).expect("valid JSON");
    assert!(doc.to_string().contains("no Google Cloud project configured"));
}

#[test]
fn test_delete_requires_name() {
    let dir = TempDir::new().expect("temp dir");
    outline_gcp(&dir).arg("delete").assert().code(2);
}
