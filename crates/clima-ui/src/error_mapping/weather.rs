use crate::services::weather_service::{LocationFailure, WeatherError as UiWeatherError};
use clima_core::{AppError, LocationError, NetworkError};

impl From<UiWeatherError> for AppError {
    fn from(e: UiWeatherError) -> Self {
        match e {
            UiWeatherError::Network(s) => AppError::Network(NetworkError::ConnectionFailed(s)),
            UiWeatherError::Timeout => AppError::Network(NetworkError::Timeout),
            UiWeatherError::Status { endpoint, status } => {
                AppError::Network(NetworkError::ServerError {
                    status,
                    message: format!("{} request failed", endpoint),
                })
            }
            UiWeatherError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
            UiWeatherError::Location(LocationFailure::Denied) => {
                AppError::Location(LocationError::PermissionDenied)
            }
            UiWeatherError::Location(LocationFailure::Unsupported) => {
                AppError::Location(LocationError::Unsupported)
            }
            UiWeatherError::Location(LocationFailure::Unavailable(s)) => {
                AppError::Location(LocationError::Unavailable(s))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_location_failures_keep_their_messages() {
        let denied = AppError::from(UiWeatherError::Location(LocationFailure::Denied));
        assert_eq!(denied.user_message(), "Permissão de localização negada.");

        let unsupported = AppError::from(UiWeatherError::Location(LocationFailure::Unsupported));
        assert_eq!(
            unsupported.user_message(),
            "Geolocalização não suportada pelo navegador."
        );
    }

    #[test]
    fn test_network_failures_map_to_network_errors() {
        let err = AppError::from(UiWeatherError::Status {
            endpoint: "forecast",
            status: 503,
        });
        assert!(matches!(
            err,
            AppError::Network(NetworkError::ServerError { status: 503, .. })
        ));

        let err = AppError::from(UiWeatherError::Network("refused".into()));
        assert_eq!(err.user_message(), "Erro de conexão. Tente novamente.");
    }

    #[test]
    fn test_timeouts_get_their_own_message() {
        let err = AppError::from(UiWeatherError::Timeout);
        assert!(matches!(err, AppError::Network(NetworkError::Timeout)));
        assert_eq!(
            err.user_message(),
            "A requisição demorou demais. Tente novamente."
        );
    }
}
