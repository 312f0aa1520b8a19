//! Integration tests for the clinic binary.
//!
//! These tests verify end-to-end behavior including:
//! - Route guarding before any network call
//! - Session persistence across invocations
//! - The create/delete-then-refetch flow against a fake backend

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;
use tiny_http::{Header, Method, Response, Server};

const TOKEN: &str = "abc";

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("clinic"))
}

/// Minimal fake of the clinic backend: login plus the doctors collection.
/// State persists across CLI invocations within one test.
fn start_backend() -> (String, Arc<Mutex<Vec<Value>>>) {
    let server = Server::http("127.0.0.1:0").expect("failed to bind fake backend");
    let port = server
        .server_addr()
        .to_ip()
        .expect("expected an IP listen address")
        .port();
    let doctors: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));

    let state = Arc::clone(&doctors);
    thread::spawn(move || {
        let mut next_id = 1i64;
        for mut request in server.incoming_requests() {
            let method = request.method().clone();
            let url = request.url().to_string();
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let authed = request
                .headers()
                .iter()
                .any(|h| h.field.equiv("Authorization") && h.value.as_str() == TOKEN);

            let (status, payload) = if method == Method::Post && url == "/api/v1/login" {
                let creds: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
                if creds["password"] == "x" {
                    (200, json!({ "token": TOKEN }).to_string())
                } else {
                    (401, json!({ "error": "Invalid email or password" }).to_string())
                }
            } else if !authed {
                (401, String::new())
            } else if method == Method::Get && url == "/api/v1/doctors" {
                (200, Value::Array(state.lock().unwrap().clone()).to_string())
            } else if method == Method::Post && url == "/api/v1/doctors" {
                let mut draft: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
                draft["id"] = json!(next_id);
                next_id += 1;
                state.lock().unwrap().push(draft);
                (201, String::new())
            } else if method == Method::Delete {
                if let Some(id) = url
                    .strip_prefix("/api/v1/doctors/")
                    .and_then(|id| id.parse::<i64>().ok())
                {
                    state.lock().unwrap().retain(|d| d["id"] != json!(id));
                    (200, String::new())
                } else {
                    (404, String::new())
                }
            } else {
                (404, String::new())
            };

            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("valid header");
            let _ = request.respond(
                Response::from_string(payload)
                    .with_status_code(status)
                    .with_header(header),
            );
        }
    });

    (format!("http://127.0.0.1:{}/api/v1", port), doctors)
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Clinic scheduling client"));
}

#[test]
fn test_protected_command_redirects_without_session() {
    let temp_dir = setup_test_dir();

    // No server needed: the guard fires before any network call
    cli()
        .arg("doctors")
        .arg("list")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_logout_is_idempotent() {
    let temp_dir = setup_test_dir();

    for _ in 0..2 {
        cli()
            .arg("logout")
            .arg("--data-dir")
            .arg(temp_dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Logged out."));
    }
}

#[test]
fn test_login_persists_session_token() {
    let temp_dir = setup_test_dir();
    let (server_url, _doctors) = start_backend();

    cli()
        .arg("login")
        .arg("--email")
        .arg("a@b.com")
        .arg("--password")
        .arg("x")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--server")
        .arg(&server_url)
        .assert()
        .success()
        .stdout(predicate::str::contains("Login successful"));

    let session = std::fs::read_to_string(temp_dir.path().join("session.json"))
        .expect("session file written");
    let session: Value = serde_json::from_str(&session).expect("session file is JSON");
    assert_eq!(session["token"], TOKEN);
}

#[test]
fn test_rejected_login_stores_nothing() {
    let temp_dir = setup_test_dir();
    let (server_url, _doctors) = start_backend();

    cli()
        .arg("login")
        .arg("--email")
        .arg("a@b.com")
        .arg("--password")
        .arg("wrong")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--server")
        .arg(&server_url)
        .assert()
        .success()
        .stderr(predicate::str::contains("Invalid email or password"));

    assert!(!temp_dir.path().join("session.json").exists());
}

#[test]
fn test_add_list_remove_flow() {
    let temp_dir = setup_test_dir();
    let (server_url, _doctors) = start_backend();

    let run = |args: &[&str]| {
        let mut cmd = cli();
        cmd.args(args)
            .arg("--data-dir")
            .arg(temp_dir.path())
            .arg("--server")
            .arg(&server_url);
        cmd
    };

    run(&["login", "--email", "a@b.com", "--password", "x"])
        .assert()
        .success();

    run(&[
        "doctors",
        "add",
        "--name",
        "Dr. Silva",
        "--email",
        "silva@example.com",
        "--specialty",
        "cardiology",
        "--crm",
        "CRM-123",
        "--phone",
        "555-0100",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Doctor created successfully."));

    run(&["doctors", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dr. Silva"));

    run(&["doctors", "remove", "1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Doctor deleted successfully."));

    run(&["doctors", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dr. Silva").not());
}

#[test]
fn test_stale_session_is_torn_down() {
    let temp_dir = setup_test_dir();
    let (server_url, _doctors) = start_backend();

    // A token the backend no longer accepts
    std::fs::write(
        temp_dir.path().join("session.json"),
        json!({ "token": "stale" }).to_string(),
    )
    .expect("seed session file");

    cli()
        .arg("doctors")
        .arg("list")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--server")
        .arg(&server_url)
        .assert()
        .success()
        .stdout(predicate::str::contains("Session expired"));

    assert!(!temp_dir.path().join("session.json").exists());
}

#[test]
fn test_schedule_add_rejects_malformed_date() {
    let temp_dir = setup_test_dir();
    let (server_url, _doctors) = start_backend();

    let mut login = cli();
    login
        .args(["login", "--email", "a@b.com", "--password", "x"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--server")
        .arg(&server_url)
        .assert()
        .success();

    cli()
        .args([
            "schedules",
            "add",
            "--doctor-id",
            "1",
            "--patient-id",
            "2",
            "--date",
            "23/08/2026",
            "--time",
            "10:00",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--server")
        .arg(&server_url)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}
