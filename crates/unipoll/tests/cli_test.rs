//! Integration tests for the `unipoll` binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! and configuration errors, all without a live controller or database.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::NamedTempFile;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `unipoll` binary with env isolation.
///
/// Clears the `UNIPOLL_*` variables the config reads and points config
/// directories at a nonexistent path so tests never touch real settings.
fn unipoll_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("unipoll");
    cmd.env("HOME", "/tmp/unipoll-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/unipoll-cli-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("UNIPOLL_CONFIG_FILE");
    for key in [
        "MODE", "INTERVAL", "MAX_ERRORS", "SITES", "DEBUG", "QUIET", "UNIFI_URL", "UNIFI_USER",
        "UNIFI_PASS", "VERIFY_SSL", "INFLUX_URL", "INFLUX_USER", "INFLUX_PASS", "INFLUX_DB",
        "TIMEOUT",
    ] {
        cmd.env_remove(format!("UNIPOLL_{key}"));
    }
    cmd
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = unipoll_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    unipoll_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("InfluxDB")
            .and(predicate::str::contains("run"))
            .and(predicate::str::contains("dump"))
            .and(predicate::str::contains("--config")),
    );
}

#[test]
fn test_version_flag() {
    unipoll_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unipoll"));
}

#[test]
fn test_debug_and_quiet_conflict() {
    unipoll_cmd()
        .args(["--debug", "--quiet", "run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_dump_rejects_unknown_target() {
    unipoll_cmd()
        .args(["dump", "networks"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    unipoll_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    unipoll_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unipoll"));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_config_file() {
    unipoll_cmd()
        .args(["--config", "/tmp/unipoll-cli-test-nonexistent/config.toml", "run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_missing_controller_url() {
    let file = config_file("unifi_user = \"poller\"\nunifi_pass = \"secret\"\n");

    unipoll_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unifi_url"));
}

#[test]
fn test_empty_database_rejected_before_connecting() {
    let file = config_file(
        "unifi_url = \"https://127.0.0.1:1\"\nunifi_user = \"poller\"\nunifi_pass = \"secret\"\ninflux_db = \"\"\n",
    );

    unipoll_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["dump", "sites"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("influx_db"));
}

#[test]
fn test_unreachable_controller_is_a_connection_error() {
    let file = config_file(
        "unifi_url = \"http://127.0.0.1:1\"\nunifi_user = \"poller\"\ntimeout = 2\n",
    );

    unipoll_cmd()
        .arg("--config")
        .arg(file.path())
        .env("UNIPOLL_UNIFI_PASS", "secret")
        .arg("run")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not connect"));
}
