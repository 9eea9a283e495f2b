//
//  buildkite-cli
//  tests/cli.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! End-to-end tests of the `bk` binary that never reach the network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `bk` with an isolated, empty configuration directory and no Buildkite
/// environment.
fn bk(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bk").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("BUILDKITE_ORGANIZATION")
        .env_remove("BUILDKITE_PIPELINE")
        .env_remove("BUILDKITE_API_TOKEN")
        .env_remove("BUILDKITE_API_URL")
        .env_remove("BK_DEBUG");
    cmd
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    bk(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    bk(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("pipeline"));
}

#[test]
fn test_missing_organization_is_reported_before_any_request() {
    let home = TempDir::new().unwrap();
    bk(&home)
        .args(["build", "view", "1", "--pipeline", "web"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("organization is required"));
}

#[test]
fn test_blank_organization_is_rejected_before_any_request() {
    let home = TempDir::new().unwrap();
    bk(&home)
        .args(["pipeline", "list", "--org", "  "])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("organization is required"));
}

#[test]
fn test_missing_pipeline_is_reported_first() {
    let home = TempDir::new().unwrap();
    bk(&home)
        .args(["build", "cancel", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pipeline is required"));
}

#[test]
fn test_retry_requires_a_job_id() {
    let home = TempDir::new().unwrap();
    bk(&home)
        .args(["job", "retry", "3", "--org", "acme", "--pipeline", "web"])
        .assert()
        .code(2);
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();
    bk(&home)
        .args(["config", "set", "defaults.organization", "acme"])
        .assert()
        .success();

    bk(&home)
        .args(["config", "get", "defaults.organization"])
        .assert()
        .success()
        .stdout(predicate::str::diff("acme\n"));
}

#[test]
fn test_config_rejects_unknown_keys() {
    let home = TempDir::new().unwrap();
    bk(&home)
        .args(["config", "set", "core.editor", "vim"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_path_points_into_app_directory() {
    let home = TempDir::new().unwrap();
    bk(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_completion_script() {
    let home = TempDir::new().unwrap();
    bk(&home)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bk"));
}
