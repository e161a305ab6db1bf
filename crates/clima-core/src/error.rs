//! Centralized error types for the Clima application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-facing messages (pt-BR) suitable for toasts
//! - Preserves full error context for debugging/logging

use std::borrow::Cow;

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message for the toast area.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0:#}")]
    Other(anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> Cow<'static, str> {
        match self {
            AppError::Network(e) => e.user_message().into(),
            AppError::Storage(e) => e.user_message().into(),
            AppError::Config(e) => e.user_message().into(),
            AppError::Weather(e) => e.user_message().into(),
            AppError::Location(e) => e.user_message().into(),
            AppError::Io(_) => "Falha ao acessar arquivos locais.".into(),
            AppError::Other(_) => "Ocorreu um erro inesperado. Tente novamente.".into(),
        }
    }
}

/// Recovers the typed error behind an `anyhow` chain, so config and IO
/// failures keep their own messages.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        let e = match e.downcast::<ConfigError>() {
            Ok(config) => return AppError::Config(config),
            Err(e) => e,
        };
        match e.downcast::<std::io::Error>() {
            Ok(io) => AppError::Io(io),
            Err(e) => AppError::Other(e),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "Erro de conexão. Tente novamente.",
            NetworkError::Timeout => "A requisição demorou demais. Tente novamente.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "O serviço de clima está instável. Tente mais tarde."
            }
            NetworkError::ServerError { .. } => "Erro de conexão. Tente novamente.",
            NetworkError::InvalidResponse(_) => "Resposta inesperada do serviço de clima.",
        }
    }
}

/// Persisted preference errors (unit, search history).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {key}: {message}")]
    ReadFailed { key: String, message: String },

    #[error("Failed to write {key}: {message}")]
    WriteFailed { key: String, message: String },

    #[error("Stored value for {key} is corrupt: {message}")]
    Corrupt { key: String, message: String },
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::ReadFailed { .. } => "Não foi possível carregar suas preferências.",
            StorageError::WriteFailed { .. } => "Não foi possível salvar suas preferências.",
            StorageError::Corrupt { .. } => "Preferências salvas inválidas foram descartadas.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuração não encontrada. Usando padrões.",
            ConfigError::Invalid(_) => "Configuração inválida. Verifique suas opções.",
            ConfigError::ParseError(_) => "Arquivo de configuração malformado.",
        }
    }
}

/// Weather lookups that succeeded but found nothing to show.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),
}

impl WeatherError {
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::LocationNotFound(query) => {
                format!("Cidade \"{}\" não encontrada.", query)
            }
        }
    }
}

/// Geolocation errors.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Geolocation unsupported")]
    Unsupported,

    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "Permissão de localização negada.",
            LocationError::Unsupported => "Geolocalização não suportada pelo navegador.",
            LocationError::Unavailable(_) => "Erro ao obter dados da localização.",
        }
    }
}
