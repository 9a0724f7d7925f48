//! Weather provider HTTP client
//!
//! This module wraps the provider's REST endpoints (`current.json`,
//! `forecast.json`, `search.json`) and turns failed requests into an
//! [`ApiError`] that says what went wrong and whether retrying can help.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default base URL for the weather provider
pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Upstream request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Broad category of a failed provider request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    InvalidRequest,
    AuthFailure,
    Forbidden,
    NotFound,
    RateLimited,
    ServiceUnavailable,
    NoResponse,
    Timeout,
    Unknown,
}

impl ApiErrorKind {
    /// Whether the same request may succeed if tried again later
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServiceUnavailable | Self::NoResponse | Self::Timeout
        )
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidRequest => "invalid request",
            Self::AuthFailure => "authentication failure",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::RateLimited => "rate limited",
            Self::ServiceUnavailable => "service unavailable",
            Self::NoResponse => "no response",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A classified provider failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message} ({details})")]
pub struct ApiError {
    /// Which logical operation failed, e.g. "Get Forecast"
    pub operation: String,
    pub kind: ApiErrorKind,
    /// Short human-readable summary
    pub message: String,
    /// Hint on what the user can do about it
    pub details: String,
    /// HTTP status, when the provider answered at all
    pub status: Option<u16>,
}

impl ApiError {
    pub fn retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Classifies a non-success HTTP response
    ///
    /// `body` is the raw response body; the provider's own error message is
    /// used when it can be found.
    pub fn from_status(operation: &str, status: StatusCode, body: &str) -> Self {
        let provider_message = serde_json::from_str::<Value>(body).ok().and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        let (kind, message, details) = match status.as_u16() {
            400 => (
                ApiErrorKind::InvalidRequest,
                provider_message.unwrap_or_else(|| "Invalid request".to_string()),
                "Please check your search query".to_string(),
            ),
            401 => (
                ApiErrorKind::AuthFailure,
                "API key is invalid".to_string(),
                "Please check your API configuration".to_string(),
            ),
            403 => (
                ApiErrorKind::Forbidden,
                "Access forbidden".to_string(),
                "Your API key may not have required permissions".to_string(),
            ),
            404 => (
                ApiErrorKind::NotFound,
                "Location not found".to_string(),
                "Please try a different city name".to_string(),
            ),
            429 => (
                ApiErrorKind::RateLimited,
                "Rate limit exceeded".to_string(),
                "Too many requests. Please wait a moment".to_string(),
            ),
            500 | 502 | 503 => (
                ApiErrorKind::ServiceUnavailable,
                "Weather service unavailable".to_string(),
                "Please try again later".to_string(),
            ),
            code => (
                ApiErrorKind::Unknown,
                provider_message.unwrap_or_else(|| "Request failed".to_string()),
                format!("Status code: {}", code),
            ),
        };

        Self {
            operation: operation.to_string(),
            kind,
            message,
            details,
            status: Some(status.as_u16()),
        }
    }

    /// Classifies a request that never produced a usable response
    pub fn from_transport(operation: &str, error: &reqwest::Error) -> Self {
        let (kind, message, details) = if error.is_timeout() {
            (
                ApiErrorKind::Timeout,
                "Request timeout".to_string(),
                "The server took too long to respond".to_string(),
            )
        } else if error.is_connect() || error.is_request() {
            (
                ApiErrorKind::NoResponse,
                "No response from weather service".to_string(),
                "Please check your internet connection".to_string(),
            )
        } else {
            (
                ApiErrorKind::Unknown,
                error.to_string(),
                "Please try again".to_string(),
            )
        };

        Self {
            operation: operation.to_string(),
            kind,
            message,
            details,
            status: error.status().map(|s| s.as_u16()),
        }
    }
}

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider rejected the request or could not be reached
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// No API key was configured
    #[error("API key is missing; set WEATHER_API_KEY or pass --api-key")]
    MissingApiKey,

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl WeatherError {
    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api(e) if e.retryable())
    }
}

/// Client for the weather provider's REST API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    /// Create a new WeatherClient against `base_url` with a 10 second timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, WeatherError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(WeatherError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(WeatherError::ClientBuild)?;

        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Create a new WeatherClient with a custom HTTP client
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch current conditions for `city` as raw JSON
    pub async fn fetch_current(&self, city: &str) -> Result<Value, WeatherError> {
        self.get_json("Get Current Weather", "current.json", &[("q", city), ("aqi", "yes")])
            .await
    }

    /// Fetch a `days`-day forecast for `city` as raw JSON
    pub async fn fetch_forecast(&self, city: &str, days: u8) -> Result<Value, WeatherError> {
        let days = days.to_string();
        self.get_json(
            "Get Forecast",
            "forecast.json",
            &[("q", city), ("days", days.as_str()), ("aqi", "yes"), ("alerts", "yes")],
        )
        .await
    }

    /// Search for cities matching `query` as raw JSON
    pub async fn fetch_search(&self, query: &str) -> Result<Value, WeatherError> {
        self.get_json("Search Cities", "search.json", &[("q", query)])
            .await
    }

    /// Issues a GET to `endpoint` and decodes the body as JSON
    ///
    /// The API key is appended to `params`. Non-success statuses and
    /// transport failures are classified into an [`ApiError`].
    async fn get_json(
        &self,
        operation: &str,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut query: Vec<(&str, &str)> = vec![("key", self.api_key.as_str())];
        query.extend_from_slice(params);

        tracing::debug!(url = %url, "API request: GET");

        let response = match self.client.get(&url).query(&query).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = ApiError::from_transport(operation, &e);
                tracing::error!(operation, kind = %error.kind, error = %e, "no response from API");
                return Err(error.into());
            }
        };

        let status = response.status();
        tracing::debug!(status = status.as_u16(), url = %url, "API response");

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(operation, &e))?;

        if !status.is_success() {
            let error = ApiError::from_status(operation, status, &text);
            tracing::error!(
                operation,
                status = status.as_u16(),
                kind = %error.kind,
                retryable = error.retryable(),
                "API error: {}",
                error.message
            );
            return Err(error.into());
        }

        Ok(serde_json::from_str(&text)?)
    }
}
