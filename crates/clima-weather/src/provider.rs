//! Forecast client for the Open-Meteo API.
//!
//! The provider performs no retries; callers decide what to do on failure.

use crate::types::{WeatherError, WeatherResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use url::Url;

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const REVERSE_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/reverse";
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const DEFAULT_LANGUAGE: &str = "pt";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Clima/0.1.0";

/// Daily fields requested from the forecast endpoint, in request order
pub const DAILY_FIELDS: [&str; 8] = [
    "weathercode",
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "windspeed_10m_max",
    "uv_index_max",
    "sunrise",
    "sunset",
];

pub const HOURLY_FIELDS: &str = "relativehumidity_2m,apparent_temperature";
pub const FORECAST_DAYS: u32 = 7;

/// Base URLs of the three endpoints the provider talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub geocoding: String,
    pub reverse_geocoding: String,
    pub forecast: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding: GEOCODING_URL.to_string(),
            reverse_geocoding: REVERSE_GEOCODING_URL.to_string(),
            forecast: FORECAST_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// All three endpoints under one base, e.g. a local mock server
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            geocoding: format!("{}/v1/search", base),
            reverse_geocoding: format!("{}/v1/reverse", base),
            forecast: format!("{}/v1/forecast", base),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    endpoints: Endpoints,
    language: String,
}

impl WeatherProvider {
    pub fn new(endpoints: Endpoints) -> Result<Self, WeatherError> {
        Self::with_options(endpoints, DEFAULT_LANGUAGE, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_options(
        endpoints: Endpoints,
        language: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            endpoints,
            language: language.to_string(),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Fetch the 7-day forecast with current conditions and hourly humidity /
    /// apparent temperature. Timezone is resolved by the API from the coordinates.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherResponse, WeatherError> {
        let url = forecast_url(&self.endpoints.forecast, latitude, longitude)?;
        self.get_json("forecast", url).await
    }

    /// GET `url` and decode the body, mapping non-success statuses to errors.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: Url,
    ) -> Result<T, WeatherError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} request returned status {}", endpoint, status);
            return Err(WeatherError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse(format!("{} response: {}", endpoint, e)))
    }
}

/// Build the forecast request URL
pub fn forecast_url(base: &str, latitude: f64, longitude: f64) -> Result<Url, WeatherError> {
    let daily = DAILY_FIELDS.join(",");
    let url = Url::parse_with_params(
        base,
        &[
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("daily", daily),
            ("current_weather", "true".to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
            ("timezone", "auto".to_string()),
        ],
    )?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_forecast_url_has_all_parameters() {
        let url = forecast_url(FORECAST_URL, 38.72, -9.14).unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(pairs["latitude"], "38.72");
        assert_eq!(pairs["longitude"], "-9.14");
        assert_eq!(
            pairs["daily"],
            "weathercode,temperature_2m_max,temperature_2m_min,precipitation_sum,windspeed_10m_max,uv_index_max,sunrise,sunset"
        );
        assert_eq!(pairs["current_weather"], "true");
        assert_eq!(pairs["hourly"], "relativehumidity_2m,apparent_temperature");
        assert_eq!(pairs["forecast_days"], "7");
        assert_eq!(pairs["timezone"], "auto");
    }

    #[test]
    fn test_endpoints_with_base() {
        let endpoints = Endpoints::with_base("http://127.0.0.1:9000/");
        assert_eq!(endpoints.geocoding, "http://127.0.0.1:9000/v1/search");
        assert_eq!(endpoints.reverse_geocoding, "http://127.0.0.1:9000/v1/reverse");
        assert_eq!(endpoints.forecast, "http://127.0.0.1:9000/v1/forecast");
    }

    #[test]
    fn test_invalid_base_url_is_reported() {
        let err = forecast_url("not a url", 0.0, 0.0).unwrap_err();
        assert!(matches!(err, WeatherError::Url(_)));
    }
}
