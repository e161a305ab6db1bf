use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::{Config, ConfigError};

/// Application configuration and lifecycle
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// Create a new application instance from the default config location
    pub fn new() -> Result<Self> {
        let (config, _) = Config::load_validated()?;
        Ok(Self::with_config(config))
    }

    /// Create an application instance from an explicit config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let config = Config::load_from(path)?;
        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }
        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        tracing::info!("Config directory: {}", config.config_dir.display());
        Self {
            config: Arc::new(config),
        }
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the config
    pub fn shared_config(&self) -> Arc<Config> {
        self.config.clone()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::AppError;

    #[test]
    fn test_from_path_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.api.forecast_url = "nope".into();
        config.save_to(&path).unwrap();

        let err = App::from_path(&path).err().unwrap();
        assert!(matches!(
            AppError::from(err),
            AppError::Config(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_path_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cache\nttl_secs = ").unwrap();

        let err = AppError::from(App::from_path(&path).err().unwrap());
        assert!(matches!(err, AppError::Config(ConfigError::ParseError(_))));
        assert_eq!(err.user_message(), "Arquivo de configuração malformado.");
    }

    #[test]
    fn test_from_path_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::from_path(&dir.path().join("config.toml")).unwrap();
        assert_eq!(app.config().search.min_query_chars, 2);
        assert_eq!(app.shared_config().config_dir, dir.path());
    }
}
