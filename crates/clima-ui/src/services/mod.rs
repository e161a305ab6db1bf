pub mod weather_service;

pub use weather_service::{
    request_location, request_reverse, request_search, request_suggestions, request_weather,
    resolve_place, LoadOrigin, LocationFailure, RequestToken, WeatherError, WeatherServiceMessage,
};
