//! Weather data for Clima
//!
//! Provides geocoding and forecasts via the Open-Meteo APIs, weather-code
//! classification, temperature units and a short-lived forecast cache.

pub mod types;
pub mod cache;
pub mod geocode;
pub mod location;
pub mod provider;

pub use types::*;
pub use cache::{cache_key, WeatherCache, DEFAULT_TTL_SECS};
pub use location::{FixedLocation, LocationSource, UnsupportedLocation};
pub use provider::{Endpoints, WeatherProvider};
