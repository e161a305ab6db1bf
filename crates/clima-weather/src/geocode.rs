//! Forward and reverse geocoding against the Open-Meteo geocoding API.

use crate::provider::WeatherProvider;
use crate::types::{Place, WeatherError};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

/// Number of candidates requested for a full search
pub const DEFAULT_RESULT_COUNT: u32 = 6;

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<Place>>,
}

impl WeatherProvider {
    /// Look up a city by name. An absent or empty `results` field is an empty
    /// vec (not found); non-success statuses are errors.
    #[instrument(skip(self), level = "info")]
    pub async fn geocode_city(&self, name: &str, count: u32) -> Result<Vec<Place>, WeatherError> {
        let url = Url::parse_with_params(
            &self.endpoints().geocoding,
            &[
                ("name", name.to_string()),
                ("count", count.to_string()),
                ("language", self.language().to_string()),
                ("format", "json".to_string()),
            ],
        )?;

        let body: GeocodingResponse = self.get_json("geocoding", url).await?;
        let places = body.results.unwrap_or_default();
        tracing::debug!("Geocoding '{}' returned {} results", name, places.len());
        Ok(places)
    }

    /// Reverse geocode coordinates to the best matching place.
    /// Returns `None` on any failure; the caller falls back to coordinates.
    #[instrument(skip(self), level = "info")]
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<Place> {
        let url = match Url::parse_with_params(
            &self.endpoints().reverse_geocoding,
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("language", self.language().to_string()),
                ("format", "json".to_string()),
            ],
        ) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("Invalid reverse geocoding URL: {}", e);
                return None;
            }
        };

        let body: GeocodingResponse = match self.get_json("reverse geocoding", url).await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode failed: {}", e);
                return None;
            }
        };

        let place = body.results?.into_iter().next()?;
        tracing::info!("Reverse geocoded to: {}", place.name);
        Some(place)
    }
}
