use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Description used when a weather code has no entry in the table
pub const UNKNOWN_CONDITION: &str = "Condição desconhecida";

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Single-letter suffix shown after the degree sign
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    /// Parse the persisted form ("C" / "F"), case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "C" | "c" => Some(Self::Celsius),
            "F" | "f" => Some(Self::Fahrenheit),
            _ => None,
        }
    }

    /// Convert a Celsius reading to this unit, rounded to a whole degree
    pub fn convert(&self, celsius: f64) -> i64 {
        match self {
            Self::Celsius => round_half_up(celsius),
            Self::Fahrenheit => to_fahrenheit(celsius),
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Round to the nearest integer with halves going towards +∞ (-2.5 → -2).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Celsius to whole-degree Fahrenheit
pub fn to_fahrenheit(celsius: f64) -> i64 {
    round_half_up(celsius * 9.0 / 5.0 + 32.0)
}

/// Format a Celsius reading in the given unit, e.g. `21°C` or `70°F`
pub fn format_temp(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{}°{}", unit.convert(celsius), unit.symbol())
}

/// Sky condition used to pick the background, icon and particle effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Sunny,
    Cloudy,
    Foggy,
    Drizzle,
    Rainy,
    Snowy,
    Stormy,
}

impl Theme {
    pub const ALL: [Theme; 7] = [
        Theme::Sunny,
        Theme::Cloudy,
        Theme::Foggy,
        Theme::Drizzle,
        Theme::Rainy,
        Theme::Snowy,
        Theme::Stormy,
    ];

    /// Classify a WMO weather code.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 | 1 => Self::Sunny,
            2 | 3 => Self::Cloudy,
            45 | 48 => Self::Foggy,
            51..=57 => Self::Drizzle,
            61..=67 => Self::Rainy,
            71..=77 => Self::Snowy,
            80..=82 => Self::Rainy,
            85 | 86 => Self::Snowy,
            95..=99 => Self::Stormy,
            _ => Self::Sunny, // Unknown codes default to sunny
        }
    }

    /// Classify a raw numeric code as it arrives in JSON.
    /// Non-integral and non-finite values are unknown, hence sunny.
    pub fn from_code_value(value: f64) -> Self {
        match code_from_value(value) {
            Some(code) => Self::from_wmo_code(code),
            None => Self::Sunny,
        }
    }

    /// Lowercase tag, also used in CSS class names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Foggy => "foggy",
            Self::Drizzle => "drizzle",
            Self::Rainy => "rainy",
            Self::Snowy => "snowy",
            Self::Stormy => "stormy",
        }
    }

    /// Parse a lowercase tag
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Emoji plus short Portuguese label for the theme badge
    pub fn emoji_label(&self) -> &'static str {
        match self {
            Self::Sunny => "☀️ Ensolarado",
            Self::Cloudy => "☁️ Nublado",
            Self::Foggy => "🌫️ Neblina",
            Self::Drizzle => "🌦️ Garoa",
            Self::Rainy => "🌧️ Chuvoso",
            Self::Snowy => "❄️ Neve",
            Self::Stormy => "⛈️ Tempestade",
        }
    }

    /// Icon identifier; the SVG itself lives with the renderer
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Sunny => "sun",
            Self::Cloudy => "cloud",
            Self::Foggy => "cloud_fog",
            Self::Drizzle => "cloud_drizzle",
            Self::Rainy => "cloud_rain",
            Self::Snowy => "cloud_snow",
            Self::Stormy => "cloud_lightning",
        }
    }

    /// Body class applied while this theme is active
    pub fn css_class(&self) -> String {
        format!("theme-{}", self.as_str())
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn code_from_value(value: f64) -> Option<i32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    Some(value as i32)
}

/// Portuguese description of a WMO weather code
pub fn describe_code(code: i32) -> &'static str {
    match code {
        0 => "Céu limpo",
        1 => "Principalmente limpo",
        2 => "Parcialmente nublado",
        3 => "Nublado",
        45 => "Névoa",
        48 => "Névoa gelada",
        51 => "Garoa leve",
        53 => "Garoa moderada",
        55 => "Garoa intensa",
        56 => "Garoa gelada leve",
        57 => "Garoa gelada intensa",
        61 => "Chuva leve",
        63 => "Chuva moderada",
        65 => "Chuva forte",
        66 => "Chuva gelada leve",
        67 => "Chuva gelada forte",
        71 => "Neve leve",
        73 => "Neve moderada",
        75 => "Neve forte",
        77 => "Granizo",
        80 => "Pancadas leves",
        81 => "Pancadas moderadas",
        82 => "Pancadas fortes",
        85 => "Neve leve",
        86 => "Neve forte",
        95 => "Trovoada",
        96 => "Trovoada c/ granizo",
        99 => "Trovoada forte",
        _ => UNKNOWN_CONDITION,
    }
}

/// Description for a raw JSON code value
pub fn describe_code_value(value: f64) -> &'static str {
    code_from_value(value).map_or(UNKNOWN_CONDITION, describe_code)
}

/// A point on the globe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A named geographic point, as returned by the geocoding API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub admin1: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Geocoding sends `null` for labels it does not know
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Place {
    /// A place labelled only by its coordinates, with `decimals` digits each
    pub fn at_coordinates(latitude: f64, longitude: f64, decimals: usize) -> Self {
        Self {
            name: format!("{:.*}, {:.*}", decimals, latitude, decimals, longitude),
            country: String::new(),
            admin1: String::new(),
            latitude,
            longitude,
        }
    }

    /// Keep a resolved name but pin it to the exact coordinates that were asked for
    pub fn relocated(self, latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            ..self
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// "Country, Region" when both are known, otherwise whichever exists
    pub fn region_label(&self) -> String {
        match (self.country.is_empty(), self.admin1.is_empty()) {
            (false, false) => format!("{}, {}", self.country, self.admin1),
            (false, true) => self.country.clone(),
            (true, false) => self.admin1.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Current conditions block of the forecast response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub windspeed: f64,
    #[serde(default)]
    pub winddirection: Option<f64>,
    pub weathercode: f64,
    #[serde(default)]
    pub time: Option<String>,
}

impl CurrentWeather {
    pub fn theme(&self) -> Theme {
        Theme::from_code_value(self.weathercode)
    }

    pub fn description(&self) -> &'static str {
        describe_code_value(self.weathercode)
    }
}

/// Parallel daily arrays, one element per forecast day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub weathercode: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub windspeed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    pub sunrise: Vec<Option<String>>,
    #[serde(default)]
    pub sunset: Vec<Option<String>>,
}

/// One day pulled out of the parallel daily arrays
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: String,
    pub weathercode: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_max: Option<f64>,
    pub uv_max: Option<f64>,
}

impl DaySummary {
    pub fn theme(&self) -> Theme {
        self.weathercode.map_or(Theme::Sunny, Theme::from_code_value)
    }

    pub fn description(&self) -> &'static str {
        self.weathercode
            .map_or(UNKNOWN_CONDITION, describe_code_value)
    }

    /// Calendar date of this entry, if the API string is a valid ISO date
    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

fn sample(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

impl DailyForecast {
    /// Number of forecast days (length of the date array)
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn day(&self, index: usize) -> Option<DaySummary> {
        let date = self.time.get(index)?.clone();
        Some(DaySummary {
            date,
            weathercode: sample(&self.weathercode, index),
            max: sample(&self.temperature_2m_max, index),
            min: sample(&self.temperature_2m_min, index),
            precipitation: sample(&self.precipitation_sum, index),
            wind_max: sample(&self.windspeed_10m_max, index),
            uv_max: sample(&self.uv_index_max, index),
        })
    }

    pub fn days(&self) -> impl Iterator<Item = DaySummary> + '_ {
        (0..self.len()).filter_map(|i| self.day(i))
    }
}

/// Hourly samples requested alongside the daily forecast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub relativehumidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub apparent_temperature: Vec<Option<f64>>,
}

impl HourlySeries {
    /// Average relative humidity over the 24 samples of `day_index`.
    /// Missing samples count as zero; `None` when the day has no samples at all.
    pub fn average_humidity(&self, day_index: usize) -> Option<f64> {
        if self.relativehumidity_2m.is_empty() {
            return None;
        }
        let start = day_index * 24;
        let slice = self.relativehumidity_2m.get(start..)?;
        let slice = &slice[..slice.len().min(24)];
        let sum: f64 = slice.iter().map(|v| v.unwrap_or(0.0)).sum();
        Some(sum / slice.len().max(1) as f64)
    }

    /// Apparent temperature at `hour` (index into the hourly array)
    pub fn apparent_at(&self, hour: usize) -> Option<f64> {
        sample(&self.apparent_temperature, hour)
    }
}

/// Forecast payload as returned by the forecast endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    pub current_weather: CurrentWeather,
    #[serde(default)]
    pub daily: DailyForecast,
    #[serde(default)]
    pub hourly: HourlySeries,
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location is not supported on this system")]
    Unsupported,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}
