//! Integration tests for the poolpack binary.
//!
//! These only exercise paths that fail before any bundling starts.

// assert_cmd::Command::cargo_bin is deprecated but still works
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;

fn poolpack(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("poolpack").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("POOLPACK_STRICT")
        .env_remove("POOLPACK_CACHE")
        .arg("-C")
        .arg(dir.path());
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"name": "workerpool", "version": "6.1.0"}"#,
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("lib/worker.js"), "self.onmessage = function () {};\n").unwrap();
    fs::write(dir.path().join("index.js"), "module.exports = {};\n").unwrap();
    dir
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("poolpack")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("tasks"));
}

#[test]
fn test_tasks_lists_graph() {
    let dir = TempDir::new().unwrap();
    poolpack(&dir)
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("bundle-worker"))
        .stdout(predicate::str::contains("embed-worker"))
        .stdout(predicate::str::contains("minify-main"))
        .stdout(predicate::str::contains("after: bundle-main, minify-main"));
}

#[test]
fn test_build_without_template_fails() {
    let dir = project();
    poolpack(&dir)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Banner template not readable"));
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn test_watch_survives_failed_first_run() {
    let dir = project();
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("poolpack"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("-C")
        .arg(dir.path())
        .arg("watch")
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    std::thread::sleep(Duration::from_secs(2));
    let still_running = child.try_wait().unwrap().is_none();
    child.kill().unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(still_running, "watch exited after the first run");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Banner template not readable"), "{stderr}");
}

#[test]
fn test_build_without_entry_fails() {
    let dir = project();
    fs::write(dir.path().join("lib/header.js"), "/** @license */\n").unwrap();
    fs::remove_file(dir.path().join("lib/worker.js")).unwrap();

    poolpack(&dir)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entry point not found"));
}

#[test]
fn test_unknown_task_fails() {
    let dir = project();
    poolpack(&dir)
        .args(["task", "deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown task"))
        .stderr(predicate::str::contains("poolpack tasks"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = project();
    poolpack(&dir)
        .args(["--config", "custom.toml", "tasks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[test]
fn test_unknown_config_key_fails() {
    let dir = project();
    fs::write(dir.path().join("poolpack.toml"), "minify-everything = true\n").unwrap();

    poolpack(&dir)
        .arg("tasks")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_invalid_config_value_fails() {
    let dir = project();
    fs::write(
        dir.path().join("poolpack.toml"),
        "[minified]\noutput = \"dist/workerpool.js\"\n",
    )
    .unwrap();

    poolpack(&dir)
        .arg("tasks")
        .assert()
        .failure()
        .stderr(predicate::str::contains("minified.output"));
}

#[test]
fn test_missing_root_fails() {
    Command::cargo_bin("poolpack")
        .unwrap()
        .env("NO_COLOR", "1")
        .args(["-C", "/nonexistent/poolpack/project", "tasks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}
