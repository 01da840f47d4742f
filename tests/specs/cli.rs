// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI front-door specs: exit codes and `init` bootstrapping.

use assert_cmd::Command;

fn pa() -> Command {
    Command::cargo_bin("pa").expect("pa binary builds")
}

#[test]
fn help_exits_zero() {
    pa().arg("--help").assert().success();
}

#[test]
fn unknown_subcommand_exits_one() {
    pa().arg("frobnicate").assert().code(1);
}

#[test]
fn missing_subcommand_exits_one() {
    pa().assert().code(1);
}

#[test]
fn init_creates_config_and_directories() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("conf");

    pa().arg("init")
        .arg("--config")
        .arg(&config_dir)
        .env("HOME", home.path())
        .assert()
        .success();

    let config_path = config_dir.join("config.json");
    assert!(config_path.exists());
    let raw = std::fs::read_to_string(&config_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(parsed["security"]["allowedCommands"].is_array());

    // default workspace/data dirs land under $HOME/.pa
    assert!(home.path().join(".pa/workspace").is_dir());
    assert!(home.path().join(".pa/data/sessions").is_dir());
}

#[test]
fn init_is_idempotent_and_preserves_existing_config() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("conf");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.json"), r#"{ "gateway": { "maxQueueSize": 3 } }"#)
        .unwrap();

    pa().arg("init")
        .arg("--config")
        .arg(&config_dir)
        .env("HOME", home.path())
        .assert()
        .success();

    let raw = std::fs::read_to_string(config_dir.join("config.json")).unwrap();
    assert!(raw.contains("\"maxQueueSize\": 3"), "existing config untouched");
}

#[test]
fn env_var_selects_the_config_dir() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("from-env");

    pa().arg("init")
        .env("PA_CONFIG", &config_dir)
        .env("HOME", home.path())
        .assert()
        .success();

    assert!(config_dir.join("config.json").exists());
}
