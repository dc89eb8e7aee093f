//! Integration tests for the `staylink` CLI binary.
//!
//! Local commands run against nothing; backend commands run against a
//! wiremock server with config and state directories in a tempdir.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `staylink` binary with env isolation.
///
/// Clears all `STAYLINK_*` env vars and points config and data
/// directories at `home`, so tests never touch the user's real setup.
fn staylink_cmd_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("staylink");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("STAYLINK_PROFILE")
        .env_remove("STAYLINK_API_URL")
        .env_remove("STAYLINK_TOKEN")
        .env_remove("STAYLINK_OUTPUT")
        .env_remove("STAYLINK_INSECURE")
        .env_remove("STAYLINK_TIMEOUT");
    cmd
}

fn staylink_cmd() -> assert_cmd::Command {
    staylink_cmd_in(Path::new("/tmp/staylink-cli-test-nonexistent"))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a command off the async runtime so wiremock keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn provider_args(server: &MockServer) -> Vec<String> {
    vec![
        "--api-url".into(),
        format!("{}/api", server.uri()),
        "--token".into(),
        "prov-token".into(),
    ]
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = staylink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    staylink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("categories")
            .and(predicate::str::contains("markup"))
            .and(predicate::str::contains("housekeeping")),
    );
}

#[test]
fn test_version_flag() {
    staylink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("staylink"));
}

#[test]
fn test_completions_bash() {
    staylink_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_output_format() {
    let output = staylink_cmd()
        .args(["--output", "xml", "catalog", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("invalid value"));
}

// ── Local commands ──────────────────────────────────────────────────

#[test]
fn test_catalog_list_plain() {
    staylink_cmd()
        .args(["catalog", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("laundry").and(predicate::str::contains("tours")));
}

#[test]
fn test_catalog_show_unknown_key() {
    let output = staylink_cmd()
        .args(["catalog", "show", "helicopters"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("catalog list"));
}

#[test]
fn test_schedule_summary_daily() {
    staylink_cmd()
        .args(["schedule", "summary", "--daily", "08:00-20:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily: 08:00 - 20:00"));
}

#[test]
fn test_schedule_rejects_bad_hours() {
    let output = staylink_cmd()
        .args(["schedule", "summary", "--open", "funday=09:00-17:00"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config errors ───────────────────────────────────────────────────

#[test]
fn test_backend_command_without_config() {
    let output = staylink_cmd().args(["categories", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("Configuration file not found"),
        "Expected missing-config error:\n{text}"
    );
}

#[test]
fn test_unknown_profile() {
    let output = staylink_cmd()
        .args(["--profile", "nope", "loyalty"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nope"));
}

#[test]
fn test_config_set_then_profiles() {
    let home = tempfile::tempdir().unwrap();

    staylink_cmd_in(home.path())
        .args(["--profile", "front-desk", "config", "set", "api_url", "https://hotel.example.com/api"])
        .assert()
        .success();
    staylink_cmd_in(home.path())
        .args(["config", "use", "front-desk"])
        .assert()
        .success();
    staylink_cmd_in(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("front-desk *"));
}

#[test]
fn test_config_set_refuses_malformed_file() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("config/staylink");
    std::fs::create_dir_all(&config_dir).unwrap();
    let original = "[defaults]\ntimeout = \"thirty\"\n\n[profiles.prod]\napi_url = \"https://api.example.com/api\"\ntoken = \"keep-me\"\n";
    std::fs::write(config_dir.join("config.toml"), original).unwrap();

    let output = staylink_cmd_in(home.path())
        .args(["config", "set", "currency", "EGP"])
        .output()
        .unwrap();

    assert!(!output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        std::fs::read_to_string(config_dir.join("config.toml")).unwrap(),
        original
    );
}

#[test]
fn test_delete_requires_yes_without_tty() {
    let output = staylink_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9/api",
            "--token",
            "t",
            "housekeeping",
            "delete",
            "hk-1",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

// ── Backend commands ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_activate_confirmed_by_backend() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/service/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "availableCategories": [], "activeCategories": [] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/service/categories/laundry/activate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Laundry is live" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = staylink_cmd_in(home.path());
    cmd.args(provider_args(&server))
        .args(["categories", "--provider", "p-1", "activate", "laundry"]);
    let output = run(cmd).await;

    let text = combined_output(&output);
    assert!(output.status.success(), "activate failed:\n{text}");
    assert!(text.contains("Laundry is live"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_routes_keep_changes_locally() {
    // No mocks mounted: every route answers 404.
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = staylink_cmd_in(home.path());
    cmd.args(provider_args(&server))
        .args(["categories", "--provider", "p-1", "activate", "transportation"]);
    let output = run(cmd).await;

    let text = combined_output(&output);
    assert!(output.status.success(), "activate failed:\n{text}");
    assert!(text.contains("working from local state"), "{text}");
    assert!(text.contains("offline mode"), "{text}");

    let state = std::fs::read_to_string(home.path().join("data/staylink/state.json")).unwrap();
    assert!(state.contains("p-1"));
    assert!(state.contains("transportation"));

    // The pending change survives into the next run.
    let mut cmd = staylink_cmd_in(home.path());
    cmd.args(provider_args(&server))
        .args(["categories", "--provider", "p-1", "status"]);
    let output = run(cmd).await;
    assert!(
        combined_output(&output).contains("+ transportation (activated offline)"),
        "{}",
        combined_output(&output)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_offline_change_replayed_once_backend_returns() {
    let home = tempfile::tempdir().unwrap();
    let state_file = home.path().join("data/staylink/state.json");

    // First run: nothing mounted, so the activation stays local.
    let offline = MockServer::start().await;
    let mut cmd = staylink_cmd_in(home.path());
    cmd.args(provider_args(&offline))
        .args(["categories", "--provider", "p-1", "activate", "transportation"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(std::fs::read_to_string(&state_file).unwrap().contains("local-pending"));

    // Second run: the backend answers and the pending change is replayed.
    let online = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/service/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "availableCategories": [], "activeCategories": [] }
        })))
        .mount(&online)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/service/categories/transportation/activate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&online)
        .await;

    let mut cmd = staylink_cmd_in(home.path());
    cmd.args(provider_args(&online))
        .args(["categories", "--provider", "p-1", "status"]);
    let output = run(cmd).await;

    let text = combined_output(&output);
    assert!(output.status.success(), "{text}");
    assert!(text.contains("Synced 1 offline change(s)"), "{text}");
    let state = std::fs::read_to_string(&state_file).unwrap();
    assert!(state.contains("\"server\""), "{state}");
    assert!(!state.contains("local-pending"), "{state}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_markup_price_for_hotel_admin() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    let config_dir = home.path().join("config/staylink");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            r#"
default_profile = "front-desk"

[profiles.front-desk]
api_url = "{}/api"
role = "hotel-admin"
hotel_id = "h-1"
token = "admin-token"
"#,
            server.uri()
        ),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/hotel/markup-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "categoryId": "laundry", "markupPercentage": 10, "providers": [] }]
        })))
        .mount(&server)
        .await;

    let mut cmd = staylink_cmd_in(home.path());
    cmd.args(["markup", "price", "laundry", "20"]);
    let output = run(cmd).await;

    let text = combined_output(&output);
    assert!(output.status.success(), "price failed:\n{text}");
    assert!(text.contains("$22.00"), "{text}");
    assert!(text.contains("10% ($2.00)"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_markup_denied_for_provider() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = staylink_cmd_in(home.path());
    cmd.args(provider_args(&server)).args(["markup", "show"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(5), "{}", combined_output(&output));
}
