//! Core data models for Skycast
//!
//! This module contains the response types returned by the weather provider
//! for current conditions, forecasts and city search. Fields the provider may
//! omit fall back to their defaults so partial payloads still decode.

pub mod weather;

pub use weather::{ApiError, ApiErrorKind, WeatherClient, WeatherError};

use serde::{Deserialize, Serialize};

/// A place the provider knows about
///
/// Search results carry `id` and `url`; weather responses carry `tz_id` and
/// `localtime` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub tz_id: Option<String>,
    #[serde(default)]
    pub localtime: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Location {
    /// "Name, Region, Country" with empty parts skipped
    pub fn display_name(&self) -> String {
        [self.name.as_str(), self.region.as_str(), self.country.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Textual weather condition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub code: u32,
}

/// Conditions right now
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    /// Temperature in Celsius
    pub temp_c: f64,
    /// Feels-like temperature in Celsius
    pub feelslike_c: f64,
    pub condition: Condition,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in km/h
    pub wind_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub precip_mm: f64,
    pub uv: f64,
    pub is_day: u8,
    pub last_updated: String,
}

/// Response of the current-conditions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location: Location,
    pub current: CurrentConditions,
}

/// Aggregates for one forecast day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: f64,
    pub maxwind_kph: f64,
    pub totalprecip_mm: f64,
    pub avghumidity: f64,
    pub daily_chance_of_rain: u8,
    pub uv: f64,
    pub condition: Condition,
}

/// Forecast for a single hour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourForecast {
    /// Local time, e.g. "2024-07-15 14:00"
    pub time: String,
    pub temp_c: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub humidity: u8,
    pub chance_of_rain: u8,
    pub precip_mm: f64,
    pub pressure_mb: f64,
}

/// Forecast for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Date, e.g. "2024-07-15"
    pub date: String,
    pub day: DaySummary,
    #[serde(default)]
    pub hour: Vec<HourForecast>,
}

/// The `forecast` block of a forecast response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastDays {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

/// Response of the forecast endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location: Location,
    pub current: CurrentConditions,
    #[serde(default)]
    pub forecast: ForecastDays,
}

impl Forecast {
    /// All hourly entries across every forecast day, in order
    pub fn hours(&self) -> impl Iterator<Item = &HourForecast> {
        self.forecast.forecastday.iter().flat_map(|day| day.hour.iter())
    }
}

/// Hourly slice of a forecast starting at a given hour of the first day
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyForecast {
    pub location: Location,
    pub hourly: Vec<HourForecast>,
}

impl HourlyForecast {
    /// Takes `hours` entries starting at hour index `start_hour` of the forecast
    pub fn from_forecast(forecast: &Forecast, start_hour: usize, hours: usize) -> Self {
        Self {
            location: forecast.location.clone(),
            hourly: forecast.hours().skip(start_hour).take(hours).cloned().collect(),
        }
    }
}
