//! Weather backend: geocoding, forecast and position lookups.
//! All network work runs in spawned tasks; results come back via mpsc,
//! tagged with the request token they were started under.

use std::sync::Arc;

use clima_weather::{Coordinates, LocationSource, Place, WeatherProvider, WeatherResponse};
use tokio::sync::mpsc::UnboundedSender;

/// Monotonically increasing id of a user-initiated load
pub type RequestToken = u64;

/// Which trigger started a weather load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    Search,
    Suggestion,
    History,
    Geolocation,
    MapClick,
}

impl LoadOrigin {
    /// Decimals used for the coordinate label when reverse geocoding finds nothing
    pub fn fallback_decimals(&self) -> usize {
        match self {
            LoadOrigin::MapClick => 3,
            _ => 2,
        }
    }

    /// Toast shown when the forecast for this trigger cannot be loaded
    pub fn failure_message(&self) -> &'static str {
        match self {
            LoadOrigin::Search | LoadOrigin::Suggestion | LoadOrigin::History => {
                "Erro de conexão. Tente novamente."
            }
            LoadOrigin::Geolocation => "Erro ao obter dados da localização.",
            LoadOrigin::MapClick => "Erro ao buscar dados desta localização.",
        }
    }
}

/// Why the device position could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationFailure {
    Denied,
    Unsupported,
    Unavailable(String),
}

/// Error type for weather operations
#[derive(Debug, Clone)]
pub enum WeatherError {
    Network(String),
    Timeout,
    Status { endpoint: &'static str, status: u16 },
    Parse(String),
    Location(LocationFailure),
}

impl std::fmt::Display for WeatherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherError::Network(s) => write!(f, "Weather error: {}", s),
            WeatherError::Timeout => write!(f, "Weather error: request timed out"),
            WeatherError::Status { endpoint, status } => {
                write!(f, "Weather error: {} returned {}", endpoint, status)
            }
            WeatherError::Parse(s) => write!(f, "Weather parse error: {}", s),
            WeatherError::Location(LocationFailure::Denied) => {
                write!(f, "Location error: permission denied")
            }
            WeatherError::Location(LocationFailure::Unsupported) => {
                write!(f, "Location error: unsupported")
            }
            WeatherError::Location(LocationFailure::Unavailable(s)) => {
                write!(f, "Location error: {}", s)
            }
        }
    }
}

impl std::error::Error for WeatherError {}

impl From<clima_weather::WeatherError> for WeatherError {
    fn from(e: clima_weather::WeatherError) -> Self {
        match e {
            clima_weather::WeatherError::Status { endpoint, status } => {
                WeatherError::Status { endpoint, status }
            }
            clima_weather::WeatherError::Parse(s) => WeatherError::Parse(s),
            clima_weather::WeatherError::Network(e) if e.is_timeout() => WeatherError::Timeout,
            other => WeatherError::Network(other.to_string()),
        }
    }
}

impl From<clima_weather::LocationError> for WeatherError {
    fn from(e: clima_weather::LocationError) -> Self {
        let failure = match e {
            clima_weather::LocationError::PermissionDenied => LocationFailure::Denied,
            clima_weather::LocationError::Unsupported => LocationFailure::Unsupported,
            other => LocationFailure::Unavailable(other.to_string()),
        };
        WeatherError::Location(failure)
    }
}

/// Messages sent from async operations back to the dashboard loop
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Forward geocoding for a full search
    SearchDone {
        token: RequestToken,
        query: String,
        origin: LoadOrigin,
        result: Result<Vec<Place>, WeatherError>,
    },
    /// Forward geocoding for the suggestion dropdown
    SuggestionsDone {
        token: RequestToken,
        result: Result<Vec<Place>, WeatherError>,
    },
    /// Forecast fetched (or failed) for `place`
    WeatherDone {
        token: RequestToken,
        place: Place,
        key: String,
        origin: LoadOrigin,
        result: Result<WeatherResponse, WeatherError>,
    },
    /// Reverse geocoding finished; `place` carries a fallback label if nothing matched
    PlaceResolved {
        token: RequestToken,
        place: Place,
        origin: LoadOrigin,
    },
    /// Device position lookup finished
    LocationDone {
        token: RequestToken,
        result: Result<Coordinates, WeatherError>,
    },
}

/// Geocode `query` for a full search. Sends `SearchDone`.
pub fn request_search(
    tx: &UnboundedSender<WeatherServiceMessage>,
    provider: Arc<WeatherProvider>,
    token: RequestToken,
    query: String,
    count: u32,
    origin: LoadOrigin,
) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = provider
            .geocode_city(&query, count)
            .await
            .map_err(WeatherError::from);
        if let Err(e) = &result {
            tracing::warn!("Search for '{}' failed: {}", query, e);
        }
        let _ = tx.send(WeatherServiceMessage::SearchDone {
            token,
            query,
            origin,
            result,
        });
    });
}

/// Geocode a partial query for the dropdown. Sends `SuggestionsDone`.
pub fn request_suggestions(
    tx: &UnboundedSender<WeatherServiceMessage>,
    provider: Arc<WeatherProvider>,
    token: RequestToken,
    query: String,
    count: u32,
) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = provider
            .geocode_city(&query, count)
            .await
            .map_err(WeatherError::from);
        let _ = tx.send(WeatherServiceMessage::SuggestionsDone { token, result });
    });
}

/// Fetch the forecast for `place`. Sends `WeatherDone`.
pub fn request_weather(
    tx: &UnboundedSender<WeatherServiceMessage>,
    provider: Arc<WeatherProvider>,
    token: RequestToken,
    place: Place,
    key: String,
    origin: LoadOrigin,
) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = provider
            .fetch_weather(place.latitude, place.longitude)
            .await
            .map_err(WeatherError::from);
        match &result {
            Ok(_) => tracing::info!("Fetched forecast for {}", place.name),
            Err(e) => tracing::warn!("Forecast for {} failed: {}", place.name, e),
        }
        let _ = tx.send(WeatherServiceMessage::WeatherDone {
            token,
            place,
            key,
            origin,
            result,
        });
    });
}

/// Name the point at `at`. Never fails: sends `PlaceResolved` with either the
/// best match pinned to `at`, or a coordinate label.
pub fn request_reverse(
    tx: &UnboundedSender<WeatherServiceMessage>,
    provider: Arc<WeatherProvider>,
    token: RequestToken,
    at: Coordinates,
    origin: LoadOrigin,
) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let place = resolve_place(&provider, at, origin).await;
        let _ = tx.send(WeatherServiceMessage::PlaceResolved {
            token,
            place,
            origin,
        });
    });
}

/// Reverse geocode with the coordinate-label fallback
pub async fn resolve_place(provider: &WeatherProvider, at: Coordinates, origin: LoadOrigin) -> Place {
    match provider.reverse_geocode(at.latitude, at.longitude).await {
        Some(found) => found.relocated(at.latitude, at.longitude),
        None => Place::at_coordinates(at.latitude, at.longitude, origin.fallback_decimals()),
    }
}

/// Ask `source` for the device position. Sends `LocationDone`.
pub fn request_location(
    tx: &UnboundedSender<WeatherServiceMessage>,
    source: Arc<dyn LocationSource>,
    token: RequestToken,
) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = source.current_position().await.map_err(WeatherError::from);
        match &result {
            Ok(pos) => tracing::info!("Got location: {}, {}", pos.latitude, pos.longitude),
            Err(e) => tracing::warn!("{}", e),
        }
        let _ = tx.send(WeatherServiceMessage::LocationDone { token, result });
    });
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use clima_weather::{Endpoints, FixedLocation, UnsupportedLocation};
    use tokio::sync::mpsc;

    #[test]
    fn weather_error_display() {
        assert!(format!("{}", WeatherError::Network("timeout".into())).contains("Weather"));
        assert!(format!(
            "{}",
            WeatherError::Status {
                endpoint: "forecast",
                status: 503
            }
        )
        .contains("503"));
        assert!(format!("{}", WeatherError::Location(LocationFailure::Denied)).contains("Location"));
    }

    #[test]
    fn location_errors_convert() {
        let e: WeatherError = clima_weather::LocationError::PermissionDenied.into();
        assert!(matches!(e, WeatherError::Location(LocationFailure::Denied)));
        let e: WeatherError = clima_weather::LocationError::Timeout.into();
        assert!(matches!(
            e,
            WeatherError::Location(LocationFailure::Unavailable(_))
        ));
    }

    #[test]
    fn fallback_labels_per_origin() {
        assert_eq!(LoadOrigin::Geolocation.fallback_decimals(), 2);
        assert_eq!(LoadOrigin::MapClick.fallback_decimals(), 3);
        assert_ne!(
            LoadOrigin::MapClick.failure_message(),
            LoadOrigin::Search.failure_message()
        );
    }

    #[tokio::test]
    async fn location_request_reports_position() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        request_location(&tx, Arc::new(FixedLocation(Coordinates::new(1.5, 2.5))), 7);
        match rx.recv().await.unwrap() {
            WeatherServiceMessage::LocationDone { token, result } => {
                assert_eq!(token, 7);
                assert_eq!(result.unwrap(), Coordinates::new(1.5, 2.5));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn location_request_reports_unsupported() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        request_location(&tx, Arc::new(UnsupportedLocation), 1);
        match rx.recv().await.unwrap() {
            WeatherServiceMessage::LocationDone { result, .. } => assert!(matches!(
                result,
                Err(WeatherError::Location(LocationFailure::Unsupported))
            )),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reverse_falls_back_to_coordinates() {
        // Nothing listens on the discard port
        let provider =
            Arc::new(WeatherProvider::new(Endpoints::with_base("http://127.0.0.1:9")).unwrap());
        let (tx, mut rx) = mpsc::unbounded_channel();
        request_reverse(
            &tx,
            provider,
            3,
            Coordinates::new(38.71234, -9.13987),
            LoadOrigin::MapClick,
        );
        match rx.recv().await.unwrap() {
            WeatherServiceMessage::PlaceResolved { token, place, origin } => {
                assert_eq!(token, 3);
                assert_eq!(origin, LoadOrigin::MapClick);
                assert_eq!(place.name, "38.712, -9.140");
                assert_eq!(place.latitude, 38.71234);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_search_reports_timeout() {
        use std::time::Duration;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "results": [] }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;
        let provider = Arc::new(
            WeatherProvider::with_options(
                Endpoints::with_base(&server.uri()),
                "pt",
                Duration::from_millis(100),
            )
            .unwrap(),
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        request_search(&tx, provider, 4, "Lisboa".into(), 6, LoadOrigin::Search);
        match rx.recv().await.unwrap() {
            WeatherServiceMessage::SearchDone { token, result, .. } => {
                assert_eq!(token, 4);
                assert!(matches!(result, Err(WeatherError::Timeout)));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
