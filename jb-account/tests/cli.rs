//! CLI integration tests for jb-account

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn escape_path_for_toml(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "\\\\")
}

/// Config pointing at a closed local port, with a file-backed session
fn setup_test_env() -> (TempDir, String, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let session_path = temp_dir.path().join("session.json");

    let config_content = format!(
        r#"
[api]
base_url = "http://127.0.0.1:9"
timeout_secs = 2

[storage]
backend = "file"
path = "{}"
"#,
        escape_path_for_toml(&session_path)
    );
    fs::write(&config_path, config_content).unwrap();

    (
        temp_dir,
        config_path.to_string_lossy().to_string(),
        session_path,
    )
}

fn seed_session(session_path: &Path) {
    let session = serde_json::json!({
        "token": "abc",
        "token_user": r#"{"id":7,"email":"ana@example.com"}"#
    });
    fs::write(session_path, session.to_string()).unwrap();
}

fn jb_account(config_path: &str) -> Command {
    let mut cmd = Command::cargo_bin("jb-account").unwrap();
    cmd.env("JOBBOARD_CONFIG", config_path)
        .env_remove("JOBBOARD_BACKEND_URL")
        .env_remove("JOBBOARD_RESET_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("jb-account")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("reset-password"))
        .stdout(predicate::str::contains("whoami"));
}

#[test]
fn test_whoami_without_session_exits_2() {
    let (_dir, config, _session) = setup_test_env();

    jb_account(&config)
        .arg("whoami")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usuario no autenticado"));
}

#[test]
fn test_whoami_reads_stored_session() {
    let (_dir, config, session) = setup_test_env();
    seed_session(&session);

    jb_account(&config)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as user 7"));

    jb_account(&config)
        .args(["--format", "json", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ana@example.com"));
}

#[test]
fn test_logout_forgets_session() {
    let (_dir, config, session) = setup_test_env();
    seed_session(&session);

    jb_account(&config)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    let remaining: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&session).unwrap()).unwrap();
    assert!(remaining.get("token").is_none());
    assert!(remaining.get("token_user").is_none());

    jb_account(&config).arg("whoami").assert().code(2);
}

#[test]
fn test_logout_recovers_from_corrupt_session_file() {
    let (_dir, config, session) = setup_test_env();
    fs::write(&session, "not json").unwrap();

    jb_account(&config).arg("logout").assert().success();

    let remaining: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&session).unwrap()).unwrap();
    assert_eq!(remaining, serde_json::json!({}));

    jb_account(&config).arg("whoami").assert().code(2);
}

#[test]
fn test_reset_password_mismatch_exits_3() {
    let (_dir, config, _session) = setup_test_env();

    jb_account(&config)
        .args(["reset-password", "--token", "reset", "--stdin"])
        .write_stdin("uno\ndos\n")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Las contraseñas no coinciden"));
}

#[test]
fn test_reset_password_missing_fields_exits_3() {
    let (_dir, config, _session) = setup_test_env();

    jb_account(&config)
        .args(["--format", "json", "reset-password", "--token", "reset", "--stdin"])
        .write_stdin("\n\n")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("Faltan campos"))
        .stdout(predicate::str::contains(r#""type":"warning""#));
}

#[test]
fn test_login_with_unreachable_backend_exits_1() {
    let (_dir, config, session) = setup_test_env();

    jb_account(&config)
        .args(["login", "--email", "ana@example.com", "--stdin"])
        .write_stdin("secreto\n")
        .assert()
        .code(1);

    assert!(!session.exists());
}

#[test]
fn test_add_project_without_session_exits_2() {
    let (_dir, config, _session) = setup_test_env();

    jb_account(&config)
        .args(["add-project", "-F", "nombre=Compilador"])
        .assert()
        .code(2);
}

#[test]
fn test_edit_rejects_malformed_field() {
    let (_dir, config, _session) = setup_test_env();

    jb_account(&config)
        .args(["edit", "-F", "no-equals-sign"])
        .assert()
        .code(3);
}
