//! Error scenario integration tests

use assert_cmd::Command;
use predicates::prelude::*;

fn voicedrop_bin(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("voicedrop").expect("binary is built");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("VOICEDROP_API_URL")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn config_get_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    voicedrop_bin(home.path())
        .args(["config", "get", "unknown_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Valid keys"));
}

#[test]
fn config_set_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    voicedrop_bin(home.path())
        .args(["config", "set", "unknown_key", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_invalid_bool() {
    let home = tempfile::tempdir().unwrap();
    voicedrop_bin(home.path())
        .args(["config", "set", "convert_to_wav", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("true").and(predicate::str::contains("false")));
}

#[test]
fn config_set_url_without_scheme() {
    let home = tempfile::tempdir().unwrap();
    voicedrop_bin(home.path())
        .args(["config", "set", "api_url", "rec.example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http://"));
}

#[test]
fn login_with_empty_password_fails_before_request() {
    let home = tempfile::tempdir().unwrap();
    voicedrop_bin(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "login", "-u", "alice", "--password-stdin"])
        .write_stdin("\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter both username and password"));
}

#[test]
fn whoami_with_unreachable_server_fails() {
    let home = tempfile::tempdir().unwrap();
    voicedrop_bin(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "whoami"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn logout_succeeds_without_server() {
    let home = tempfile::tempdir().unwrap();
    voicedrop_bin(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "logout"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Logged out"));
}

#[test]
fn convert_missing_file() {
    let home = tempfile::tempdir().unwrap();
    let output = home.path().join("out.wav");
    voicedrop_bin(home.path())
        .arg("convert")
        .arg(home.path().join("missing.flac"))
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
    assert!(!output.exists());
}

#[test]
fn convert_unknown_extension() {
    let home = tempfile::tempdir().unwrap();
    voicedrop_bin(home.path())
        .args(["convert", "notes.txt", "out.wav"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot tell the audio format"));
}
