//! Command-line interface parsing for Skycast
//!
//! This module handles parsing of CLI arguments using clap. The API key and
//! base URL can also come from `WEATHER_API_KEY` and `WEATHER_API_BASE_URL`.

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::data::weather::DEFAULT_BASE_URL;
use crate::service::DEFAULT_FORECAST_DAYS;
use crate::units::TemperatureUnit;

/// Error types for CLI configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// No API key on the command line or in the environment
    #[error("API key is missing; set WEATHER_API_KEY or pass --api-key")]
    MissingApiKey,

    /// The base URL is not an http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

/// Skycast - current weather, forecasts and city search from the terminal
#[derive(Parser, Debug)]
#[command(name = "skycast")]
#[command(about = "Current weather, forecasts and city search with a 60 second response cache")]
#[command(version)]
pub struct Cli {
    /// Weather provider API key
    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Weather provider base URL
    #[arg(long, env = "WEATHER_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Temperature unit for output
    #[arg(long, value_enum, default_value_t = TemperatureUnit::Celsius)]
    pub units: TemperatureUnit,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show current conditions for one or more cities
    Current {
        #[arg(required = true)]
        cities: Vec<String>,
    },
    /// Show a daily forecast
    Forecast {
        city: String,
        /// Number of days (1-10)
        #[arg(long, default_value_t = DEFAULT_FORECAST_DAYS)]
        days: u32,
    },
    /// Show hourly forecasts starting now
    Hourly {
        city: String,
        /// Number of hours
        #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..=240))]
        hours: u32,
    },
    /// Search for cities by name
    Search { query: String },
    /// Re-fetch cities on an interval through the cache and report cache status
    Watch {
        #[arg(required = true)]
        cities: Vec<String>,
        /// Seconds between rounds
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
        /// Stop after this many rounds
        #[arg(long)]
        rounds: Option<u32>,
    },
    /// Check that the API key is accepted
    Validate,
}

/// Settings derived from CLI arguments for talking to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub api_key: String,
    pub base_url: String,
    pub units: TemperatureUnit,
}

impl RuntimeConfig {
    /// Creates a RuntimeConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(RuntimeConfig)` with a non-empty key and an http(s) base URL
    /// * `Err(CliError)` otherwise
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let api_key = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(CliError::MissingApiKey)?;

        let base_url = cli.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CliError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(RuntimeConfig {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            units: cli.units,
        })
    }
}
