//! Integration tests for CLI argument handling
//!
//! Tests subcommand parsing and configuration errors from the command line.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_skycast"))
        .args(args)
        .env_remove("WEATHER_API_KEY")
        .env_remove("WEATHER_API_BASE_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute skycast")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skycast"), "Help should mention skycast");
    assert!(stdout.contains("forecast"), "Help should list the forecast command");
    assert!(stdout.contains("watch"), "Help should list the watch command");
}

#[test]
fn test_missing_api_key_prints_error_and_exits() {
    let output = run_cli(&["current", "London"]);
    assert!(
        !output.status.success(),
        "Expected missing API key to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("API key is missing"),
        "Should print error message about the API key: {}",
        stderr
    );
}

#[test]
fn test_invalid_base_url_prints_error() {
    let output = run_cli(&["--api-key", "k", "--base-url", "not-a-url", "validate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid base URL"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_units_is_rejected() {
    let output = run_cli(&["--units", "kelvin", "search", "london"]);
    assert!(!output.status.success());
}

#[test]
fn test_short_search_needs_no_network() {
    // One-character queries are answered locally with no results
    let output = run_cli(&["--api-key", "k", "--base-url", "http://127.0.0.1:9", "search", "x"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No cities found"), "stdout: {}", stdout);
}

#[test]
fn test_watch_prints_final_cleanup_before_exit() {
    // Lookups fail fast against a closed port; the cache report still prints
    let output = run_cli(&[
        "--api-key",
        "k",
        "--base-url",
        "http://127.0.0.1:9",
        "watch",
        "london",
        "--rounds",
        "1",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let cleaned = stdout
        .find("Cleaned 0 expired cache entries")
        .unwrap_or_else(|| panic!("missing cleanup report, stdout: {}", stdout));
    assert!(
        stdout[cleaned..].contains("Cache: 0 entries"),
        "missing snapshot after cleanup, stdout: {}",
        stdout
    );
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use skycast::cli::{Cli, CliError, Command, RuntimeConfig};
    use skycast::units::TemperatureUnit;

    #[test]
    fn test_cli_current_with_several_cities() {
        let cli = Cli::parse_from(["skycast", "current", "London", "Paris", "Tokyo"]);
        match cli.command {
            Command::Current { cities } => assert_eq!(cities, vec!["London", "Paris", "Tokyo"]),
            other => panic!("Expected current command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_hourly_default_hours() {
        let cli = Cli::parse_from(["skycast", "hourly", "Oslo"]);
        assert_eq!(
            cli.command,
            Command::Hourly {
                city: "Oslo".into(),
                hours: 24
            }
        );
    }

    #[test]
    fn test_cli_watch_defaults() {
        let cli = Cli::parse_from(["skycast", "watch", "Oslo"]);
        assert_eq!(
            cli.command,
            Command::Watch {
                cities: vec!["Oslo".into()],
                interval: 30,
                rounds: None,
            }
        );
    }

    #[test]
    fn test_cli_watch_rejects_zero_interval() {
        assert!(Cli::try_parse_from(["skycast", "watch", "Oslo", "--interval", "0"]).is_err());
    }

    #[test]
    fn test_runtime_config_keeps_units() {
        let cli = Cli::parse_from([
            "skycast",
            "--api-key",
            "abc",
            "--base-url",
            "http://localhost:8080/v1",
            "--units",
            "fahrenheit",
            "validate",
        ]);
        let config = RuntimeConfig::from_cli(&cli).expect("config should be valid");
        assert_eq!(config.units, TemperatureUnit::Fahrenheit);
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_runtime_config_without_key() {
        let cli = Cli {
            api_key: None,
            base_url: "https://example.com".into(),
            units: TemperatureUnit::Celsius,
            verbose: false,
            command: Command::Validate,
        };
        assert_eq!(RuntimeConfig::from_cli(&cli), Err(CliError::MissingApiKey));
    }
}
