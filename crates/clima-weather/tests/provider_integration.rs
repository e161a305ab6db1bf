//! Integration tests for WeatherProvider using wiremock.

use clima_weather::{Endpoints, Theme, WeatherError, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> WeatherProvider {
    WeatherProvider::new(Endpoints::with_base(&server.uri())).unwrap()
}

fn lisboa() -> serde_json::Value {
    serde_json::json!({
        "id": 2267057,
        "name": "Lisboa",
        "latitude": 38.72,
        "longitude": -9.14,
        "country": "Portugal",
        "admin1": "Lisboa"
    })
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 38.72,
        "longitude": -9.14,
        "timezone": "Europe/Lisbon",
        "current_weather": {
            "temperature": 19.6,
            "windspeed": 12.3,
            "winddirection": 310,
            "weathercode": 61,
            "time": "2026-10-18T14:00"
        },
        "daily": {
            "time": ["2026-10-18", "2026-10-19"],
            "weathercode": [61, 3],
            "temperature_2m_max": [21.4, 20.0],
            "temperature_2m_min": [14.2, null],
            "precipitation_sum": [3.2, 0.0],
            "windspeed_10m_max": [25.1, 18.0],
            "uv_index_max": [3.5, 4.0],
            "sunrise": ["2026-10-18T07:40", "2026-10-19T07:41"],
            "sunset": ["2026-10-18T18:50", "2026-10-19T18:48"]
        },
        "hourly": {
            "time": ["2026-10-18T00:00"],
            "relativehumidity_2m": [80],
            "apparent_temperature": [17.0]
        }
    })
}

#[tokio::test]
async fn test_geocode_city_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Lisboa"))
        .and(query_param("count", "6"))
        .and(query_param("language", "pt"))
        .and(query_param("format", "json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [lisboa()] })),
        )
        .mount(&mock_server)
        .await;

    let places = provider_for(&mock_server).geocode_city("Lisboa", 6).await.unwrap();

    assert_eq!(places.len(), 1);
    assert_eq!(places[0].name, "Lisboa");
    assert_eq!(places[0].country, "Portugal");
    assert_eq!(places[0].latitude, 38.72);
}

#[tokio::test]
async fn test_geocode_city_without_results_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "generationtime_ms": 0.5
        })))
        .mount(&mock_server)
        .await;

    let places = provider_for(&mock_server).geocode_city("Nowhere", 6).await.unwrap();
    assert!(places.is_empty());
}

#[tokio::test]
async fn test_geocode_city_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server).geocode_city("Lisboa", 6).await.unwrap_err();
    assert!(matches!(err, WeatherError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_reverse_geocode_returns_first_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .and(query_param("latitude", "38.72"))
        .and(query_param("longitude", "-9.14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [lisboa(), { "name": "Other", "latitude": 0.0, "longitude": 0.0 }]
        })))
        .mount(&mock_server)
        .await;

    let place = provider_for(&mock_server).reverse_geocode(38.72, -9.14).await;
    assert_eq!(place.map(|p| p.name), Some("Lisboa".to_string()));
}

#[tokio::test]
async fn test_reverse_geocode_swallows_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    assert!(provider_for(&mock_server).reverse_geocode(1.0, 2.0).await.is_none());
}

#[tokio::test]
async fn test_reverse_geocode_unreachable_host_is_none() {
    let provider = WeatherProvider::new(Endpoints::with_base("http://127.0.0.1:9")).unwrap();
    assert!(provider.reverse_geocode(1.0, 2.0).await.is_none());
}

#[tokio::test]
async fn test_fetch_weather_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("current_weather", "true"))
        .and(query_param("forecast_days", "7"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock_server)
        .await;

    let data = provider_for(&mock_server).fetch_weather(38.72, -9.14).await.unwrap();

    assert_eq!(data.current_weather.theme(), Theme::Rainy);
    assert_eq!(data.daily.len(), 2);
    assert_eq!(data.daily.temperature_2m_max[0], Some(21.4));
    assert_eq!(data.daily.temperature_2m_min[1], None);
    assert_eq!(data.hourly.relativehumidity_2m[0], Some(80.0));
}

#[tokio::test]
async fn test_fetch_weather_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server).fetch_weather(0.0, 0.0).await.unwrap_err();
    assert!(matches!(err, WeatherError::Status { endpoint: "forecast", status: 429 }));
}

#[tokio::test]
async fn test_fetch_weather_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server).fetch_weather(0.0, 0.0).await.unwrap_err();
    assert!(matches!(err, WeatherError::Parse(_)));
}
