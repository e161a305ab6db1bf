use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory (persisted preferences live here too)
    pub config_dir: PathBuf,

    /// Open-Meteo endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// Forecast cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Search box behaviour
    #[serde(default)]
    pub search: SearchConfig,

    /// Forecast carousel timings and geometry
    #[serde(default)]
    pub carousel: CarouselConfig,

    /// Map tiles and zoom
    #[serde(default)]
    pub map: MapConfig,

    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,

    /// Fixed position used for "use my location"
    #[serde(default)]
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub geocoding_url: String,
    pub reverse_geocoding_url: String,
    pub forecast_url: String,
    /// Language for place names
    pub language: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            reverse_geocoding_url: "https://geocoding-api.open-meteo.com/v1/reverse".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            language: "pt".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a fetched forecast is reused (seconds)
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before suggestions are fetched
    pub debounce_ms: u64,
    /// Minimum trimmed input length that triggers suggestions
    pub min_query_chars: usize,
    /// Candidates shown in the dropdown
    pub suggestion_count: u32,
    /// Candidates requested for a full search
    pub result_count: u32,
    /// Recent searches kept
    pub history_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 380,
            min_query_chars: 2,
            suggestion_count: 5,
            result_count: 6,
            history_limit: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    pub autoplay_ms: u64,
    /// Autoplay resumes this long after arrow or dot navigation
    pub resume_ms: u64,
    /// Autoplay resumes this long after a touch ends
    pub touch_resume_ms: u64,
    /// Card width in pixels, gap excluded
    pub card_width: f64,
    pub card_gap: f64,
    /// Width of the scroll container in pixels
    pub container_width: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay_ms: 2200,
            resume_ms: 4000,
            touch_resume_ms: 3000,
            card_width: 86.0,
            card_gap: 10.0,
            container_width: 288.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub tile_url: String,
    pub attribution: String,
    pub zoom: u8,
    pub max_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© <a href=\"https://openstreetmap.org\">OpenStreetMap</a>".to_string(),
            zoom: 11,
            max_zoom: 18,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long a toast stays visible
    pub toast_ms: u64,

    /// Viewport width used by the background animation
    pub viewport_width: u32,

    /// Viewport height used by the background animation
    pub viewport_height: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_ms: 3400,
            viewport_width: 1280,
            viewport_height: 800,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    /// Both coordinates, when configured
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clima");

        Self {
            config_dir,
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            search: SearchConfig::default(),
            carousel: CarouselConfig::default(),
            map: MapConfig::default(),
            ui: UiConfig::default(),
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.message().to_string()))
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.api.geocoding_url, "api.geocoding_url", &mut result);
        self.validate_url(
            &self.api.reverse_geocoding_url,
            "api.reverse_geocoding_url",
            &mut result,
        );
        self.validate_url(&self.api.forecast_url, "api.forecast_url", &mut result);

        if self.api.language.trim().is_empty() {
            result.add_error("api.language", "Language must not be empty");
        }
        if self.api.timeout_secs == 0 {
            result.add_error("api.timeout_secs", "Timeout must be greater than 0");
        }

        if self.cache.ttl_secs == 0 {
            result.add_warning("cache.ttl_secs", "Forecast caching disabled (0 seconds)");
        }

        if self.search.history_limit == 0 {
            result.add_warning("search.history_limit", "Search history disabled");
        }
        if self.search.result_count == 0 {
            result.add_error("search.result_count", "Result count must be greater than 0");
        }
        if self.search.min_query_chars == 0 {
            result.add_warning(
                "search.min_query_chars",
                "Suggestions will be fetched for empty input",
            );
        }

        if self.carousel.autoplay_ms == 0 {
            result.add_error("carousel.autoplay_ms", "Autoplay interval must be greater than 0");
        }
        if self.carousel.card_width <= 0.0 {
            result.add_error("carousel.card_width", "Card width must be positive");
        }

        if self.map.zoom > self.map.max_zoom {
            result.add_warning("map.zoom", "Zoom is above max_zoom and will be clamped");
        }

        if self.ui.viewport_width == 0 || self.ui.viewport_height == 0 {
            result.add_error("ui.viewport", "Viewport dimensions must be greater than 0");
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("location.latitude", "Latitude must be within [-90, 90]");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error("location.longitude", "Longitude must be within [-180, 180]");
                }
            }
            (None, None) => {}
            _ => result.add_warning(
                "location",
                "Only one coordinate configured - location lookup unavailable",
            ),
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// File holding persisted preferences (unit, search history)
    pub fn storage_path(&self) -> PathBuf {
        self.config_dir.join("storage.json")
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("no user config directory".into()))?
            .join("clima");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_default_timings() {
        let config = Config::default();
        assert_eq!(config.search.debounce_ms, 380);
        assert_eq!(config.search.history_limit, 8);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.carousel.autoplay_ms, 2200);
        assert_eq!(config.ui.toast_ms, 3400);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.api.forecast_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "api.forecast_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.api.geocoding_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_out_of_range_location() {
        let mut config = Config::default();
        config.location.latitude = Some(120.0);
        config.location.longitude = Some(0.0);
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "location.latitude"));
    }

    #[test]
    fn test_half_configured_location_is_warning() {
        let mut config = Config::default();
        config.location.latitude = Some(38.7);
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "location"));
        assert!(config.location.coordinates().is_none());
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_load_from_creates_defaults_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.config_dir, dir.path());

        let mut edited = created.clone();
        edited.search.debounce_ms = 500;
        edited.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.search.debounce_ms, 500);
        assert_eq!(loaded.storage_path(), dir.path().join("storage.json"));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("config_dir = \"/tmp/clima\"\n").unwrap();
        assert_eq!(config.map.zoom, 11);
        assert_eq!(config.api.language, "pt");
    }
}
