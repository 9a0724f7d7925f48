//! Cache-first data-fetch layer
//!
//! Every lookup checks the shared [`ResponseCache`] before calling the
//! provider, stores successful responses, and reports whether the answer
//! came from the cache and how long it stays valid.
//!
//! Concurrent misses for the same key are not coalesced: each caller fetches
//! and the last response written wins.

use chrono::{Local, Timelike};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::cache::{ResponseCache, CACHE_DURATION_SECS};
use crate::data::{
    CurrentWeather, Forecast, HourlyForecast, Location, WeatherClient, WeatherError,
};

/// Shortest search query that reaches the provider
pub const MIN_QUERY_LEN: usize = 2;

/// Forecast length accepted by the provider
pub const MAX_FORECAST_DAYS: u32 = 10;

/// Default forecast length
pub const DEFAULT_FORECAST_DAYS: u32 = 7;

/// Cache keys for each kind of lookup
///
/// The identifier is trimmed and lowercased so that "London", " london "
/// and "LONDON" share one entry.
pub mod cache_key {
    pub fn normalize(identifier: &str) -> String {
        identifier.trim().to_lowercase()
    }

    pub fn weather(city: &str) -> String {
        format!("weather-{}", normalize(city))
    }

    pub fn forecast(city: &str, days: u32) -> String {
        format!("forecast-{}-{}", normalize(city), days)
    }

    pub fn search(query: &str) -> String {
        format!("search-{}", normalize(query))
    }
}

/// A lookup result annotated with its cache state
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub data: T,
    /// Whether the data was served from the cache
    pub from_cache: bool,
    /// Seconds until the cached copy expires
    pub cache_time_remaining: u64,
}

impl<T> Cached<T> {
    fn fresh(data: T) -> Self {
        Self {
            data,
            from_cache: false,
            cache_time_remaining: CACHE_DURATION_SECS,
        }
    }

    /// Applies `f` to the data, keeping the cache annotation
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            data: f(self.data),
            from_cache: self.from_cache,
            cache_time_remaining: self.cache_time_remaining,
        }
    }
}

/// Clamps a requested forecast length to what the provider accepts
pub fn clamp_forecast_days(days: u32) -> u32 {
    let valid = days.clamp(1, MAX_FORECAST_DAYS);
    if valid != days {
        tracing::warn!(
            requested = days,
            adjusted = valid,
            "forecast days adjusted (valid range: 1-{})",
            MAX_FORECAST_DAYS
        );
    }
    valid
}

/// Weather lookups backed by a shared response cache
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: WeatherClient,
    cache: Arc<ResponseCache<Value>>,
}

impl WeatherService {
    pub fn new(client: WeatherClient, cache: Arc<ResponseCache<Value>>) -> Self {
        Self { client, cache }
    }

    /// The cache this service reads and writes
    pub fn cache(&self) -> &Arc<ResponseCache<Value>> {
        &self.cache
    }

    /// Current conditions for `city`
    pub async fn current_weather(
        &self,
        city: &str,
    ) -> Result<Cached<CurrentWeather>, WeatherError> {
        let city = city.trim();
        self.cached_or_fetch(&cache_key::weather(city), "weather", || {
            self.client.fetch_current(city)
        })
        .await
    }

    /// Daily forecast for `city`; `days` is clamped to 1-10
    pub async fn forecast(
        &self,
        city: &str,
        days: u32,
    ) -> Result<Cached<Forecast>, WeatherError> {
        let city = city.trim();
        let days = clamp_forecast_days(days);
        // days <= MAX_FORECAST_DAYS, so the narrowing cannot truncate
        let request_days = days as u8;
        self.cached_or_fetch(&cache_key::forecast(city, days), "forecast", || {
            self.client.fetch_forecast(city, request_days)
        })
        .await
    }

    /// Cities matching `query`
    ///
    /// Queries shorter than [`MIN_QUERY_LEN`] characters after trimming
    /// return no results without touching the cache or the network.
    pub async fn search_cities(
        &self,
        query: &str,
    ) -> Result<Cached<Vec<Location>>, WeatherError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Cached {
                data: Vec::new(),
                from_cache: false,
                cache_time_remaining: 0,
            });
        }

        self.cached_or_fetch(&cache_key::search(query), "search results", || {
            self.client.fetch_search(query)
        })
        .await
    }

    /// The next `hours` hourly forecasts for `city`, starting at the current local hour
    pub async fn hourly_forecast(
        &self,
        city: &str,
        hours: u32,
    ) -> Result<Cached<HourlyForecast>, WeatherError> {
        let start_hour = Local::now().hour();
        self.hourly_forecast_from(city, hours, start_hour).await
    }

    /// Like [`hourly_forecast`](Self::hourly_forecast) with an explicit start hour
    pub async fn hourly_forecast_from(
        &self,
        city: &str,
        hours: u32,
        start_hour: u32,
    ) -> Result<Cached<HourlyForecast>, WeatherError> {
        let days = hours.div_ceil(24).max(1);
        let forecast = self.forecast(city, days).await?;
        Ok(forecast.map(|f| {
            HourlyForecast::from_forecast(&f, start_hour as usize, hours as usize)
        }))
    }

    /// Current conditions for several cities at once
    ///
    /// Each city succeeds or fails on its own; results keep input order.
    pub async fn current_weather_many(
        &self,
        cities: &[String],
    ) -> Vec<(String, Result<Cached<CurrentWeather>, WeatherError>)> {
        let lookups = cities.iter().map(|city| async move {
            let result = self.current_weather(city).await;
            if let Err(ref e) = result {
                tracing::warn!(city = %city, error = %e, "weather lookup failed");
            }
            (city.clone(), result)
        });
        join_all(lookups).await
    }

    /// Checks the configured API key with an uncached request
    pub async fn validate_api_key(&self) -> bool {
        match self.client.fetch_current("London").await {
            Ok(_) => true,
            Err(WeatherError::Api(e)) => {
                tracing::error!(status = ?e.status, kind = %e.kind, "API key validation failed");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "API key validation failed");
                false
            }
        }
    }

    /// Serves `key` from the cache or fetches, decodes and stores it
    ///
    /// A response that does not decode into `T` is not cached.
    async fn cached_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        what: &str,
        fetch: F,
    ) -> Result<Cached<T>, WeatherError>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, WeatherError>>,
    {
        if let Some(value) = self.cache.get(key) {
            let remaining = self.cache.remaining_ttl(key).unwrap_or(0);
            tracing::info!(key, expires_in_secs = remaining, "using cached {}", what);
            return Ok(Cached {
                data: T::deserialize(&value)?,
                from_cache: true,
                cache_time_remaining: remaining,
            });
        }

        let value = fetch().await?;
        let data = T::deserialize(&value)?;
        self.cache.set(key, value);
        Ok(Cached::fresh(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_keys_normalize_identifier() {
        assert_eq!(cache_key::weather("  London "), "weather-london");
        assert_eq!(cache_key::weather("LONDON"), cache_key::weather("london"));
        assert_eq!(cache_key::forecast("New York", 7), "forecast-new york-7");
        assert_eq!(cache_key::search(" PAR "), "search-par");
    }

    #[test]
    fn test_clamp_forecast_days() {
        assert_eq!(clamp_forecast_days(0), 1);
        assert_eq!(clamp_forecast_days(1), 1);
        assert_eq!(clamp_forecast_days(7), 7);
        assert_eq!(clamp_forecast_days(10), 10);
        assert_eq!(clamp_forecast_days(14), 10);
    }

    #[test]
    fn test_cached_map_keeps_annotation() {
        let cached = Cached {
            data: 21,
            from_cache: true,
            cache_time_remaining: 12,
        };
        let mapped = cached.map(|v| v * 2);

        assert_eq!(mapped.data, 42);
        assert!(mapped.from_cache);
        assert_eq!(mapped.cache_time_remaining, 12);
    }

    #[test]
    fn test_fresh_reports_full_window() {
        let cached = Cached::fresh("x");
        assert!(!cached.from_cache);
        assert_eq!(cached.cache_time_remaining, 60);
    }
}
