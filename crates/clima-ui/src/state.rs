//! Application state: unit preference, search history, current selection
//! and the forecast cache.
//!
//! `unit` and `history` are persisted through a [`KeyValueStore`]; the rest
//! lives only as long as the session.

use chrono::{DateTime, Utc};
use clima_weather::{Place, TemperatureUnit, WeatherCache, WeatherResponse};

use crate::storage::KeyValueStore;

pub const UNIT_KEY: &str = "unit";
pub const HISTORY_KEY: &str = "weatherHistory";
pub const DEFAULT_HISTORY_LIMIT: usize = 8;

pub struct AppState {
    unit: TemperatureUnit,
    history: Vec<String>,
    history_limit: usize,
    current_data: Option<WeatherResponse>,
    current_place: Option<Place>,
    weather_cache: WeatherCache,
    store: Box<dyn KeyValueStore>,
}

impl AppState {
    /// Restore persisted preferences from `store`. Unreadable or invalid
    /// values fall back to Celsius and an empty history.
    pub fn load(store: Box<dyn KeyValueStore>, cache: WeatherCache, history_limit: usize) -> Self {
        let unit = match store.get(UNIT_KEY) {
            Ok(Some(raw)) => TemperatureUnit::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Ignoring unknown stored unit {:?}", raw);
                TemperatureUnit::default()
            }),
            Ok(None) => TemperatureUnit::default(),
            Err(e) => {
                tracing::warn!("Failed to read unit preference: {}", e);
                TemperatureUnit::default()
            }
        };

        let mut history: Vec<String> = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt search history: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read search history: {}", e);
                Vec::new()
            }
        };
        history.truncate(history_limit);

        tracing::info!(
            "Loaded preferences: unit {}, {} recent searches",
            unit,
            history.len()
        );

        Self {
            unit,
            history,
            history_limit,
            current_data: None,
            current_place: None,
            weather_cache: cache,
            store,
        }
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Most recent first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn current_data(&self) -> Option<&WeatherResponse> {
        self.current_data.as_ref()
    }

    pub fn current_place(&self) -> Option<&Place> {
        self.current_place.as_ref()
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
        if let Err(e) = self.store.set(UNIT_KEY, unit.symbol()) {
            tracing::warn!("Failed to persist unit: {}", e);
        }
    }

    /// Move `name` to the front, dropping any exact duplicate and anything
    /// past the limit, then persist the whole list.
    pub fn add_to_history(&mut self, name: &str) {
        self.history.retain(|h| h != name);
        self.history.insert(0, name.to_string());
        self.history.truncate(self.history_limit);

        match serde_json::to_string(&self.history) {
            Ok(json) => {
                if let Err(e) = self.store.set(HISTORY_KEY, &json) {
                    tracing::warn!("Failed to persist search history: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to encode search history: {}", e),
        }
    }

    pub fn set_cache_weather(&mut self, key: &str, data: WeatherResponse) {
        self.set_cache_weather_at(key, data, Utc::now());
    }

    pub fn set_cache_weather_at(&mut self, key: &str, data: WeatherResponse, now: DateTime<Utc>) {
        self.weather_cache.insert_at(key, data, now);
    }

    /// Fresh cached payload for `key`, or `None` once the entry is older than the TTL
    pub fn get_cache_weather(&self, key: &str) -> Option<&WeatherResponse> {
        self.get_cache_weather_at(key, Utc::now())
    }

    pub fn get_cache_weather_at(&self, key: &str, now: DateTime<Utc>) -> Option<&WeatherResponse> {
        self.weather_cache.get_at(key, now)
    }

    pub fn set_current(&mut self, place: Place, data: WeatherResponse) {
        self.current_place = Some(place);
        self.current_data = Some(data);
    }

    pub fn clear_current(&mut self) {
        self.current_place = None;
        self.current_data = None;
    }
}
