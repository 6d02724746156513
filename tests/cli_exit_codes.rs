//! Exit codes of the `cmg` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmg() -> Command {
    let mut cmd = Command::cargo_bin("cmg").unwrap();
    cmd.env_remove("CMG_VERBOSE")
        .env_remove("CMG_OFFLINE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_exits_zero() {
    cmg()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("download"))
        .stdout(predicate::str::contains("freeze"));
}

#[test]
fn test_verb_help_exits_zero() {
    cmg().args(["freeze", "-h"]).assert().success();
}

#[test]
fn test_version_mentions_name() {
    cmg()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("cmg "));
}

#[test]
fn test_freeze_without_tag_is_a_usage_error() {
    cmg().arg("freeze").assert().code(2);
}

#[test]
fn test_two_points_is_a_usage_error() {
    cmg().args(["download", "a", "b"]).assert().code(2);
}

#[test]
fn test_unknown_verb_is_a_usage_error() {
    cmg().arg("sync").assert().code(2);
}

#[test]
fn test_outside_a_container_fails() {
    let temp_dir = TempDir::new().unwrap();
    cmg()
        .arg("-C")
        .arg(temp_dir.path())
        .arg("status")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("_stream"));
}

#[test]
fn test_offline_upload_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("_stream"), "").unwrap();
    cmg()
        .current_dir(temp_dir.path())
        .args(["--offline", "upload"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("offline"));
}
