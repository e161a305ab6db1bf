//! Region renderers. Each entry point fills one [`Region`] of the page from
//! a template in [`templates`].

pub mod format;
pub mod icons;
pub mod templates;

use chrono::{NaiveDateTime, Timelike};
use clima_weather::{format_temp, Place, TemperatureUnit, Theme, WeatherResponse};
use minijinja::context;
use serde::Serialize;
use tokio::time::Instant;

use crate::carousel::CarouselView;
use crate::page::{Page, Region, Toast, ToastKind, CAROUSEL_SLOT};

pub use minijinja::Error as RenderError;

/// Inputs to a weather render that do not come from the payload
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub unit: TemperatureUnit,
    /// Local wall-clock time
    pub now: NaiveDateTime,
}

#[derive(Serialize)]
struct UnitButton {
    id: String,
    symbol: &'static str,
    active: bool,
}

/// One forecast day, formatted for both the carousel cards and the week grid
#[derive(Serialize)]
struct DayView {
    label: String,
    date: String,
    card_icon: String,
    week_icon: String,
    description: &'static str,
    max: String,
    min: String,
    precipitation: String,
    wind: String,
    uv: String,
}

#[derive(Serialize)]
struct Arrow {
    side: &'static str,
    label: &'static str,
    svg: &'static str,
    opacity: String,
    pointer: &'static str,
}

impl Arrow {
    fn new(side: &'static str, label: &'static str, svg: &'static str, disabled: bool) -> Self {
        Self {
            side,
            label,
            svg,
            opacity: CarouselView::arrow_opacity(disabled).to_string(),
            pointer: if disabled { "none" } else { "auto" },
        }
    }
}

pub fn show_toast(
    page: &mut Page,
    message: &str,
    kind: ToastKind,
    hide_at: Instant,
) -> Result<(), RenderError> {
    let html = templates::render(
        templates::TOAST,
        context! { icon => kind.icon(), message },
    )?;
    let toast = Toast {
        message: message.to_string(),
        kind,
        hide_at,
    };
    page.set_toast(toast, html);
    Ok(())
}

pub fn render_unit_buttons(page: &mut Page, unit: TemperatureUnit) -> Result<(), RenderError> {
    let units: Vec<UnitButton> = [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit]
        .into_iter()
        .map(|u| UnitButton {
            id: u.symbol().to_lowercase(),
            symbol: u.symbol(),
            active: u == unit,
        })
        .collect();
    let html = templates::render(templates::UNIT_BUTTONS, context! { units })?;
    page.replace(Region::UnitButtons, html);
    Ok(())
}

/// Recent-search pills, or nothing at all when history is empty
pub fn render_history(page: &mut Page, history: &[String]) -> Result<(), RenderError> {
    let html = templates::render(
        templates::HISTORY,
        context! { cities => history, pin => icons::PIN },
    )?;
    page.replace(Region::History, html);
    Ok(())
}

pub fn show_loading(page: &mut Page) -> Result<(), RenderError> {
    let html = templates::render(templates::LOADING, context! {})?;
    page.replace(Region::WeatherContent, html);
    page.clear(Region::ForecastCards);
    page.clear(Region::Carousel);
    Ok(())
}

pub fn show_empty(page: &mut Page) -> Result<(), RenderError> {
    let html = templates::render(
        templates::EMPTY,
        context! { icon => icons::icon(Theme::Sunny, 120) },
    )?;
    page.replace(Region::WeatherContent, html);
    page.clear(Region::ForecastCards);
    page.clear(Region::Carousel);
    Ok(())
}

/// Fill the dropdown; an empty list hides it instead
pub fn render_suggestions(page: &mut Page, results: &[Place]) -> Result<(), RenderError> {
    if results.is_empty() {
        hide_suggestions(page);
        return Ok(());
    }

    let html = templates::render(
        templates::SUGGESTIONS,
        context! { places => results, pin => icons::SUGGESTION_PIN },
    )?;
    page.replace(Region::Suggestions, html);
    page.set_suggestions_visible(true);
    Ok(())
}

pub fn hide_suggestions(page: &mut Page) {
    page.set_suggestions_visible(false);
}

/// Switch the body class for `theme`
pub fn apply_theme(page: &mut Page, theme: Theme) {
    page.set_body_class(theme.css_class());
}

/// Render the full weather view for `place` and apply its theme.
/// Returns the theme so the caller can retarget the atmosphere.
pub fn render_weather(
    page: &mut Page,
    ctx: &RenderContext,
    data: &WeatherResponse,
    place: &Place,
) -> Result<Theme, RenderError> {
    let unit = ctx.unit;
    let cw = &data.current_weather;
    let theme = cw.theme();
    let today = ctx.now.date();
    let first = data.daily.day(0);

    let days: Vec<DayView> = data
        .daily
        .days()
        .map(|day| DayView {
            label: format::day_name_str(&day.date, today),
            date: format::short_date(&day.date),
            card_icon: icons::icon(day.theme(), 38),
            week_icon: icons::icon(day.theme(), 44),
            description: day.description(),
            max: format::temp_or_dash(day.max, unit),
            min: format::temp_or_dash(day.min, unit),
            precipitation: format!("{:.1}", day.precipitation.unwrap_or(0.0)),
            wind: day.wind_max.unwrap_or(0.0).to_string(),
            uv: format!("{:.1}", day.uv_max.unwrap_or(0.0)),
        })
        .collect();

    let cards = templates::render(templates::FORECAST_CARDS, context! { days => &days })?;
    let region = (!place.country.is_empty()).then(|| place.region_label());
    let content = templates::render(
        templates::WEATHER,
        context! {
            badge => theme.emoji_label(),
            name => &place.name,
            region,
            pin => icons::PIN,
            temp => unit.convert(cw.temperature),
            symbol => unit.symbol(),
            icon => icons::icon(theme, 100),
            description => cw.description(),
            chips => context! {
                max => icons::CHIP_MAX,
                min => icons::CHIP_MIN,
                wind => icons::CHIP_WIND,
                feels => icons::CHIP_FEELS,
                humidity => icons::CHIP_HUMIDITY,
                clock => icons::CHIP_CLOCK,
            },
            max => format::temp_or_dash(first.as_ref().and_then(|d| d.max), unit),
            min => format::temp_or_dash(first.as_ref().and_then(|d| d.min), unit),
            wind => cw.windspeed.to_string(),
            apparent => format::apparent_label(data.hourly.apparent_at(ctx.now.hour() as usize), unit),
            humidity => format::humidity_label(data.hourly.average_humidity(0)),
            updated => format::clock(ctx.now),
            coords => format::coords_label(place.latitude, place.longitude),
            carousel_slot => CAROUSEL_SLOT,
            days,
        },
    )?;

    apply_theme(page, theme);
    page.replace(Region::ForecastCards, cards);
    page.replace(Region::WeatherContent, content);
    tracing::debug!(
        "Rendered {} ({}, {} forecast days)",
        place.name,
        theme,
        data.daily.len()
    );
    Ok(theme)
}

/// Arrows, scroll strip and dots for the current carousel position
pub fn render_carousel(page: &mut Page, view: &CarouselView) -> Result<(), RenderError> {
    let html = templates::render(
        templates::CAROUSEL,
        context! {
            prev => Arrow::new("prev", "Anterior", icons::ARROW_PREV, view.prev_disabled),
            next => Arrow::new("next", "Próximo", icons::ARROW_NEXT, view.next_disabled),
            scroll_left => view.scroll_left.to_string(),
            cards => page.region(Region::ForecastCards),
            index => view.index,
            total => view.total,
        },
    )?;
    page.replace(Region::Carousel, html);
    Ok(())
}

/// Serialize the whole page, with the carousel spliced into the weather view
pub fn document(page: &Page) -> Result<String, RenderError> {
    let toast_class = match (page.toast(), page.toast_visible()) {
        (Some(t), true) => format!("show {}", t.kind.as_str()),
        _ => String::new(),
    };
    let content = page
        .region(Region::WeatherContent)
        .replace(CAROUSEL_SLOT, page.region(Region::Carousel));

    templates::render(
        templates::PAGE,
        context! {
            body_class => page.body_class(),
            input => page.input_value(),
            suggestions_visible => page.suggestions_visible(),
            suggestions => page.region(Region::Suggestions),
            units => page.region(Region::UnitButtons),
            history => page.region(Region::History),
            content,
            toast_class,
            toast => page.region(Region::Toast),
        },
    )
}

/// Plain-text one-liner for logs and the terminal
pub fn summary_line(data: &WeatherResponse, place: &Place, unit: TemperatureUnit) -> String {
    format!(
        "{}: {}, {}",
        place.name,
        format_temp(data.current_weather.temperature, unit),
        data.current_weather.description()
    )
}
