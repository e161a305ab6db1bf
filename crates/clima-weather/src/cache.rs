//! In-memory forecast cache with lazy expiry.
//!
//! Entries are keyed by coordinates rounded to two decimals. A stale entry
//! stays in memory until it is overwritten but is never returned.

use crate::types::WeatherResponse;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Five minutes
pub const DEFAULT_TTL_SECS: i64 = 300;

/// Cache key for a coordinate pair: `"lat,lon"` with two decimals each
pub fn cache_key(latitude: f64, longitude: f64) -> String {
    format!("{:.2},{:.2}", latitude, longitude)
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: WeatherResponse,
    stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WeatherCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store a payload stamped with the current time
    pub fn insert(&mut self, key: &str, data: WeatherResponse) {
        self.insert_at(key, data, Utc::now());
    }

    pub fn insert_at(&mut self, key: &str, data: WeatherResponse, now: DateTime<Utc>) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                stored_at: now,
            },
        );
    }

    /// Fresh payload for `key`, or `None` when absent or stale
    pub fn get(&self, key: &str) -> Option<&WeatherResponse> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<&WeatherResponse> {
        let entry = self.entries.get(key)?;
        if now - entry.stored_at < self.ttl {
            Some(&entry.data)
        } else {
            None
        }
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::CurrentWeather;

    fn sample_response(temperature: f64) -> WeatherResponse {
        WeatherResponse {
            latitude: None,
            longitude: None,
            timezone: None,
            current_weather: CurrentWeather {
                temperature,
                windspeed: 10.0,
                winddirection: None,
                weathercode: 0.0,
                time: None,
            },
            daily: Default::default(),
            hourly: Default::default(),
        }
    }

    #[test]
    fn test_cache_key_rounds_to_two_decimals() {
        assert_eq!(cache_key(38.7223, -9.1393), "38.72,-9.14");
        assert_eq!(cache_key(0.0, 0.0), "0.00,0.00");
    }

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = WeatherCache::default();
        let t0 = Utc::now();
        cache.insert_at("38.72,-9.14", sample_response(20.0), t0);

        let hit = cache.get_at("38.72,-9.14", t0 + Duration::minutes(4) + Duration::seconds(59));
        assert_eq!(hit.map(|d| d.current_weather.temperature), Some(20.0));
    }

    #[test]
    fn test_miss_at_and_after_ttl() {
        let mut cache = WeatherCache::default();
        let t0 = Utc::now();
        cache.insert_at("38.72,-9.14", sample_response(20.0), t0);

        assert!(cache.get_at("38.72,-9.14", t0 + Duration::minutes(5)).is_none());
        assert!(cache.get_at("38.72,-9.14", t0 + Duration::hours(1)).is_none());
        // Stale entries are not evicted
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_refreshes_timestamp() {
        let mut cache = WeatherCache::default();
        let t0 = Utc::now();
        cache.insert_at("k", sample_response(1.0), t0);
        cache.insert_at("k", sample_response(2.0), t0 + Duration::minutes(10));

        let hit = cache.get_at("k", t0 + Duration::minutes(12));
        assert_eq!(hit.map(|d| d.current_weather.temperature), Some(2.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_unknown_key_misses() {
        let cache = WeatherCache::default();
        assert!(cache.get("1.00,2.00").is_none());
        assert!(cache.is_empty());
    }
}
