//! Skycast - current weather, forecasts and city search from the terminal
//!
//! Every provider response is kept for 60 seconds in an in-memory cache, so
//! repeated lookups within a run (notably `watch`) skip the network.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use skycast::cache::ResponseCache;
use skycast::cli::{Cli, Command, RuntimeConfig};
use skycast::data::WeatherClient;
use skycast::service::WeatherService;
use skycast::status::{self, StatusConfig, StatusHandle, StatusMessage};
use skycast::units::TemperatureUnit;
use skycast::{logging, render};

/// How long `watch` waits for the last cleanup report before exiting
const FINAL_STATUS_WAIT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = RuntimeConfig::from_cli(&cli)?;
    let client = WeatherClient::new(&config.base_url, &config.api_key)?;
    let service = WeatherService::new(client, Arc::new(ResponseCache::new()));
    let unit = config.units;

    match cli.command {
        Command::Current { cities } if cities.len() == 1 => {
            let weather = service.current_weather(&cities[0]).await?;
            print!("{}", render::current(&weather, unit));
        }
        Command::Current { cities } => {
            print_many(&service, &cities, unit).await;
        }
        Command::Forecast { city, days } => {
            let forecast = service.forecast(&city, days).await?;
            print!("{}", render::forecast(&forecast, unit));
        }
        Command::Hourly { city, hours } => {
            let hourly = service.hourly_forecast(&city, hours).await?;
            print!("{}", render::hourly(&hourly, unit));
        }
        Command::Search { query } => {
            let results = service.search_cities(&query).await?;
            print!("{}", render::search(&query, &results));
        }
        Command::Watch {
            cities,
            interval,
            rounds,
        } => {
            watch(&service, &cities, Duration::from_secs(interval), rounds, unit).await;
        }
        Command::Validate => {
            if service.validate_api_key().await {
                println!("API key is valid");
            } else {
                return Err("API key was rejected by the weather service".into());
            }
        }
    }

    Ok(())
}

/// Prints current conditions for each city, reporting failures inline
async fn print_many(service: &WeatherService, cities: &[String], unit: TemperatureUnit) {
    for (city, result) in service.current_weather_many(cities).await {
        match result {
            Ok(weather) => print!("{}", render::current(&weather, unit)),
            Err(e) => println!("{}: {}", city, e),
        }
    }
}

fn print_status(message: &StatusMessage) {
    match message {
        StatusMessage::Stats(stats) => print!("{}", render::cache_stats(stats)),
        StatusMessage::CleanedUp(removed) => println!("Cleaned {} expired cache entries", removed),
        StatusMessage::Cleared => println!("All cache entries cleared"),
    }
}

/// Re-fetches `cities` every `interval` until `rounds` is reached or Ctrl-C
///
/// Expired entries are swept after every round; cache status is printed as
/// the status task publishes it.
async fn watch(
    service: &WeatherService,
    cities: &[String],
    interval: Duration,
    rounds: Option<u32>,
    unit: TemperatureUnit,
) {
    let mut status = StatusHandle::spawn(service.cache().clone(), StatusConfig::default());
    let mut ticker = tokio::time::interval(interval);
    let mut round: u32 = 0;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                round += 1;
                tracing::info!(round, "refreshing {} cities", cities.len());
                print_many(service, cities, unit).await;
                if rounds.is_some_and(|limit| round >= limit) {
                    for message in status.cleanup_and_wait(FINAL_STATUS_WAIT).await {
                        print_status(&message);
                    }
                    break;
                }
                status.request_cleanup().await;
            }
            Some(message) = status.receiver.recv() => {
                print_status(&message);
            }
            _ = &mut ctrl_c => {
                break;
            }
        }
    }

    while let Some(message) = status::try_recv(&mut status) {
        print_status(&message);
    }
    status.shutdown().await;
}
