//! Integration tests for the `portico` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a server; the list/write tests run against a wiremock API.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `portico` binary with env isolation.
///
/// Clears all `PORTICO_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn portico_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("portico");
    cmd.env("HOME", "/tmp/portico-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/portico-cli-test-nonexistent")
        .env_remove("PORTICO_PROFILE")
        .env_remove("PORTICO_API_URL")
        .env_remove("PORTICO_TOKEN")
        .env_remove("PORTICO_OUTPUT")
        .env_remove("PORTICO_COLOR")
        .env_remove("PORTICO_QUIET")
        .env_remove("PORTICO_YES")
        .env_remove("PORTICO_INSECURE")
        .env_remove("PORTICO_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let api = format!("{}/api", server.uri());
    let mut cmd = portico_cmd();
    cmd.args(["--api-url", &api, "--token", "test-token"]).args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = portico_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    portico_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("announcements")
            .and(predicate::str::contains("violations"))
            .and(predicate::str::contains("users")),
    );
}

#[test]
fn test_version_flag() {
    portico_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("portico"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    portico_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    portico_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Subcommand shape ────────────────────────────────────────────────

#[test]
fn test_content_subcommands_exist() {
    portico_cmd()
        .args(["announcements", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("create"))
                .and(predicate::str::contains("publish"))
                .and(predicate::str::contains("pin"))
                .and(predicate::str::contains("archive")),
        );
}

#[test]
fn test_users_have_no_transitions() {
    let output = portico_cmd()
        .args(["users", "publish", "7"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_violations_archive_only() {
    portico_cmd()
        .args(["violations", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("archive").and(predicate::str::contains("publish").not()));
}

#[test]
fn test_config_subcommands_exist() {
    portico_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("set-token"))
                .and(predicate::str::contains("profiles")),
        );
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = portico_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_list_without_config_fails() {
    portico_cmd()
        .args(["announcements", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config").or(predicate::str::contains("api-url")));
}

#[test]
fn test_unknown_profile_is_reported() {
    portico_cmd()
        .args(["--profile", "staging", "news", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_config_show_no_config() {
    portico_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_use_switches_default_profile() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("portico");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        r#"default_profile = "prod"

[profiles.prod]
api_url = "https://cms.example.org/api"

[profiles.staging]
api_url = "https://staging.example.org/api"
"#,
    )
    .unwrap();

    portico_cmd()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["config", "use", "staging"])
        .assert()
        .success();

    portico_cmd()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("staging *"))
        .stdout(predicate::str::contains("prod\n"));
}

#[test]
fn test_invalid_output_format() {
    let output = portico_cmd()
        .args(["--output", "invalid", "announcements", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Against a mock API ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_sends_filters_and_renders_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/announcements"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("PageNumber", "1"))
        .and(query_param("PageSize", "10"))
        .and(query_param("SearchTerm", "flood"))
        .and(query_param("Status", "Published"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": 1, "title": "Flood warning", "status": "Published" },
                { "id": 2, "title": "Flood cleanup", "status": "Published" }
            ],
            "totalItems": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &[
            "-o",
            "json-compact",
            "announcements",
            "list",
            "--search",
            "  flood ",
            "--filter",
            "status=published",
        ],
    )
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let listed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(listed[1]["title"], "Flood cleanup");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_plain_output_prints_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": 4, "name": "Editor" }, { "id": 9, "name": "Viewer" }],
            "totalItems": 2
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "roles", "list"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "4\n9");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalid_create_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["announcements", "create", "--set", "title=Hi"]).await;
    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("content"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_record_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "title": "Not Found" })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["documents", "get", "77"]).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delete_with_yes_skips_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/news/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["--yes", "news", "delete", "12"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("News item deleted."));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delete_without_terminal_requires_yes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 12, "title": "Old" })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["news", "delete", "12"]).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_conflict_exits_six() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/roles"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "Role name taken" })),
        )
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &["roles", "create", "--set", "name=Editor", "--set", "permissions=news.write"],
    )
    .await;
    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Role name taken"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_get_export_feeds_back_into_update() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/announcements/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "title": "Water main repair",
            "content": "Expect low pressure on Elm St.",
            "category": "Maintenance",
            "status": "Published",
            "isPinned": true,
            "pinnedOrder": 2,
            "publishAt": "2026-04-02T08:00:00Z",
            "createdAt": "2026-03-30T12:00:00Z",
            "updatedAt": "2026-04-01T09:30:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/announcements/5"))
        .and(body_partial_json(json!({
            "title": "Water main repair",
            "category": "Maintenance",
            "isPinned": true,
            "pinnedOrder": 2
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let export = run_against(&server, &["-o", "json", "announcements", "get", "5"]).await;
    assert!(export.status.success(), "{}", combined_output(&export));

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("announcement.json");
    std::fs::write(&file, &export.stdout).unwrap();

    let output = run_against(
        &server,
        &["announcements", "update", "5", "--from-file", file.to_str().unwrap()],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
}
