//! Portuguese (pt-BR) labels for dates, readings and markup escaping.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use clima_weather::{format_temp, TemperatureUnit};

const SHORT_WEEKDAYS: [&str; 7] = ["seg.", "ter.", "qua.", "qui.", "sex.", "sáb.", "dom."];
const LONG_WEEKDAYS: [&str; 7] = [
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
    "domingo",
];
const SHORT_MONTHS: [&str; 12] = [
    "jan.", "fev.", "mar.", "abr.", "mai.", "jun.", "jul.", "ago.", "set.", "out.", "nov.", "dez.",
];

pub fn weekday_name(day: Weekday, short: bool) -> &'static str {
    let idx = day.num_days_from_monday() as usize;
    if short {
        SHORT_WEEKDAYS[idx]
    } else {
        LONG_WEEKDAYS[idx]
    }
}

/// Label a forecast day relative to `today`: "Hoje", "Amanhã", or the
/// weekday name. Both sides are calendar dates, so the difference is a
/// whole number of days regardless of DST shifts in between.
pub fn day_name(date: NaiveDate, today: NaiveDate, short: bool) -> String {
    match date.signed_duration_since(today).num_days() {
        0 => "Hoje".to_string(),
        1 => "Amanhã".to_string(),
        _ => weekday_name(date.weekday(), short).to_string(),
    }
}

/// Same as [`day_name`] for an ISO `YYYY-MM-DD` string; unparseable input is returned as-is
pub fn day_name_str(date: &str, today: NaiveDate) -> String {
    match parse_date(date) {
        Some(d) => day_name(d, today, true),
        None => date.to_string(),
    }
}

/// "18 de out."
pub fn short_date(date: &str) -> String {
    match parse_date(date) {
        Some(d) => format!("{:02} de {}", d.day(), SHORT_MONTHS[d.month0() as usize]),
        None => date.to_string(),
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Rounded percentage, or "--" when there is nothing to average
pub fn humidity_label(average: Option<f64>) -> String {
    match average {
        Some(avg) => format!("{}%", clima_weather::round_half_up(avg)),
        None => "--".to_string(),
    }
}

/// A temperature in the active unit, or "--" when the sample is missing
pub fn temp_or_dash(celsius: Option<f64>, unit: TemperatureUnit) -> String {
    celsius.map_or_else(|| "--".to_string(), |c| format_temp(c, unit))
}

/// Feels-like reading; an em dash when the hour is out of range
pub fn apparent_label(celsius: Option<f64>, unit: TemperatureUnit) -> String {
    celsius.map_or_else(|| "—".to_string(), |c| format_temp(c, unit))
}

/// "HH:MM", as shown next to "Atualizado"
pub fn clock(now: NaiveDateTime) -> String {
    now.format("%H:%M").to_string()
}

/// Coordinates with four decimals, as shown on the map card
pub fn coords_label(latitude: f64, longitude: f64) -> String {
    format!("{:.4}, {:.4}", latitude, longitude)
}
