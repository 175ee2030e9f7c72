//! Integration tests for the TripSage CLI

use std::process::{Command, Output};

fn tripsage(args: &[&str]) -> Output {
    let config_home = std::env::temp_dir().join("tripsage-cli-tests");
    Command::new(env!("CARGO_BIN_EXE_tripsage"))
        .args(args)
        .env("XDG_CONFIG_HOME", &config_home)
        .env("RUST_LOG", "error")
        .env_remove("OPENAI_API_KEY")
        .env_remove("TRIPSAGE_LLM__API_KEY")
        .output()
        .expect("Failed to execute command")
}

fn plan_args<'a>(budget: &'a str, dates: &'a str) -> Vec<&'a str> {
    vec![
        "plan",
        "--from",
        "Mumbai",
        "--to",
        "Paris",
        "--dates",
        dates,
        "--interests",
        "museums, food",
        "--budget",
        budget,
    ]
}

/// Test that the CLI shows help with the subcommands
#[test]
fn test_cli_help() {
    let output = tripsage(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tripsage"));
    assert!(stdout.contains("plan"));
    assert!(stdout.contains("serve"));
}

#[test]
fn test_cli_version() {
    let output = tripsage(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

/// Blank fields are rejected before any agent is contacted
#[test]
fn test_plan_with_blank_dates() {
    let output = tripsage(&plan_args("80000", " "));
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Please fill in all required fields"), "{stderr}");
    assert!(stderr.contains("Travel Dates"));
}

#[test]
fn test_plan_with_non_numeric_budget() {
    let output = tripsage(&plan_args("eighty thousand", "Dec 20-25, 2024"));
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Budget must be a number"), "{stderr}");
}

/// A valid request without a model key fails with a configuration error
#[test]
fn test_plan_without_api_key() {
    let output = tripsage(&plan_args("80000", "Dec 20-25, 2024"));
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No model API key configured"), "{stderr}");
}

#[test]
fn test_invalid_config_file() {
    let path = std::env::temp_dir().join("tripsage-invalid-config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();

    let output = tripsage(&["--config", path.to_str().unwrap(), "plan", "--help"]);
    // help is handled by the parser before the config is read
    assert!(output.status.success());

    let output = tripsage(&[
        "--config",
        path.to_str().unwrap(),
        "plan",
        "--from",
        "Mumbai",
        "--to",
        "Paris",
        "--dates",
        "Dec 20-25, 2024",
        "--interests",
        "food",
        "--budget",
        "80000",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load configuration"), "{stderr}");
}
