//! Integration tests for the `hartkey` CLI binary.
//!
//! Argument parsing, help output, completions and error exit codes run
//! offline; the API-bound commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `hartkey` binary with env isolation.
///
/// Clears all `HARTKEY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn hartkey_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hartkey");
    cmd.env("HOME", "/tmp/hartkey-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/hartkey-cli-test-nonexistent")
        .env_remove("HARTKEY_TOKEN")
        .env_remove("HARTKEY_OUTPUT")
        .env_remove("HARTKEY_BEARER_TOKEN")
        .env_remove("HARTKEY_BEARER_TOKEN_ENV")
        .env_remove("HARTKEY_UPDATE_INTERVAL")
        .env_remove("HARTKEY_TIMEOUT")
        .env_remove("HARTKEY_HOUSEHOLD_URL")
        .env_remove("HARTKEY_EVENTS_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Same as [`hartkey_cmd`], aimed at a mock API with a token set.
fn mocked_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = hartkey_cmd();
    cmd.env("HARTKEY_TOKEN", "test-token")
        .env("HARTKEY_HOUSEHOLD_URL", format!("{}/api/v2/app", server.uri()))
        .env("HARTKEY_EVENTS_URL", format!("{}/api/v2", server.uri()));
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mock_api() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/app/devices/intercom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "devices": [
                    {
                        "id": 101,
                        "device_type": "intercom",
                        "description": "Front door",
                        "capabilities": [{ "name": "open_door", "setup": true }]
                    },
                    {
                        "id": 202,
                        "device_type": "gate",
                        "name_by_user": "Garage",
                        "capabilities": []
                    }
                ]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/events/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "items": [
                    {
                        "id": "e1",
                        "device_id": 101,
                        "event_type": "rfid_open_local",
                        "raised_at": "2024-06-15T12:00:00Z"
                    }
                ]
            }
        })))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = hartkey_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    hartkey_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("devices")
            .and(predicate::str::contains("events"))
            .and(predicate::str::contains("open"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    hartkey_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hartkey"));
}

#[test]
fn test_completions_bash() {
    hartkey_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_config_subcommands_exist() {
    hartkey_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("set-token")),
        );
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_devices_without_token_is_auth_error() {
    let output = hartkey_cmd().arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("token"), "Expected token hint:\n{text}");
}

#[test]
fn test_interval_out_of_range_is_usage_error() {
    hartkey_cmd()
        .args(["--token", "t", "--interval", "0", "devices"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("update_interval"));
}

#[test]
fn test_invalid_output_format() {
    let output = hartkey_cmd()
        .args(["--output", "yaml", "devices"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_config_show_no_config() {
    hartkey_cmd().args(["config", "show"]).assert().success();
}

// ── Against a mock API ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_plain_lists_ids() {
    let server = mock_api().await;
    mocked_cmd(&server)
        .args(["--output", "plain", "devices"])
        .assert()
        .success()
        .stdout("101\n202\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_actionable_filter() {
    let server = mock_api().await;
    mocked_cmd(&server)
        .args(["--output", "plain", "devices", "--actionable"])
        .assert()
        .success()
        .stdout("101\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_events_json() {
    let server = mock_api().await;
    let output = mocked_cmd(&server)
        .args(["--output", "json", "events"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let events: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(events[0]["device_id"], "101");
    assert_eq!(events[0]["event_type"], "rfid_open_local");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_events_unknown_device_is_not_found() {
    let server = mock_api().await;
    mocked_cmd(&server)
        .args(["events", "--device", "999"])
        .assert()
        .code(4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_open_inactive_device_fails() {
    let server = mock_api().await;
    mocked_cmd(&server)
        .args(["open", "202"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("cannot be opened"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_open_posts_command() {
    let server = mock_api().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/app/devices/101/open"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    mocked_cmd(&server)
        .args(["open", "101"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Front door"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_rejected_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/app/devices/intercom"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    mocked_cmd(&server).arg("check").assert().code(3);
}
