//! Integration tests for the `tutora` CLI binary.
//!
//! Argument parsing, help output, completions and error exit codes run
//! without a backend; the session tests drive the binary against a
//! wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `tutora` binary with env isolation.
///
/// Clears all `TUTORA_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn tutora_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tutora");
    cmd.env("HOME", "/tmp/tutora-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/tutora-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/tutora-cli-test-nonexistent")
        .env_remove("TUTORA_PROFILE")
        .env_remove("TUTORA_API_URL")
        .env_remove("TUTORA_STATE_FILE")
        .env_remove("TUTORA_OUTPUT")
        .env_remove("TUTORA_TIMEOUT")
        .env_remove("TUTORA_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// A command bound to `server` with its session kept in `state`.
fn session_cmd(server: &MockServer, state: &Path) -> assert_cmd::Command {
    let mut cmd = tutora_cmd();
    cmd.arg("--api-url")
        .arg(server.uri())
        .arg("--state-file")
        .arg(state);
    cmd
}

/// Run a blocking command without stalling the mock server's runtime.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = tutora_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_workflows() {
    tutora_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("login")
            .and(predicate::str::contains("reserve"))
            .and(predicate::str::contains("cart"))
            .and(predicate::str::contains("favorites")),
    );
}

#[test]
fn test_version_flag() {
    tutora_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tutora"));
}

#[test]
fn test_invalid_subcommand() {
    tutora_cmd()
        .arg("enroll")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_completions_bash() {
    tutora_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tutora"));
}

#[test]
fn test_cart_add_requires_a_target() {
    tutora_cmd()
        .args(["cart", "add"])
        .assert()
        .failure()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_status_without_config_reports_no_config() {
    let output = tutora_cmd().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("No API URL configured"));
}

#[test]
fn test_unknown_profile_is_not_found() {
    let output = tutora_cmd()
        .args(["--profile", "nowhere", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nowhere"));
}

// ── Session against a mock backend ──────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_session_for_later_commands() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_json(json!({ "mobile": "0600000000", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/enfants"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut login = session_cmd(&server, &state);
    login
        .env("TUTORA_PASSWORD", "pw")
        .args(["login", "--mobile", "0600000000"]);
    let output = run(login).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(state.exists());

    let mut status = session_cmd(&server, &state);
    status.args(["status", "-o", "json"]);
    let output = run(status).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["phase"], "needs-child");
    assert_eq!(body["children"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_exits_with_auth_code() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Mot de passe incorrect" })),
        )
        .mount(&server)
        .await;

    let mut login = session_cmd(&server, &dir.path().join("state.json"));
    login
        .env("TUTORA_PASSWORD", "wrong")
        .args(["login", "--mobile", "0600000000"]);
    let output = run(login).await;
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Mot de passe incorrect"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cart_before_login_is_rejected_locally() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let mut cart = session_cmd(&server, &dir.path().join("state.json"));
    cart.args(["cart", "list"]);
    let output = run(cart).await;
    // Not signed in: nothing reaches the server.
    assert_eq!(output.status.code(), Some(3));
    assert!(server.received_requests().await.unwrap().is_empty());
}
