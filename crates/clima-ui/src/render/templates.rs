//! Page templates, compiled into the binary and parsed once.
//!
//! Names end in `.html` so minijinja escapes every interpolated value;
//! pre-rendered fragments and inline SVGs go through `|safe`.

use std::sync::OnceLock;

use minijinja::Environment;
use serde::Serialize;

pub const PAGE: &str = "page.html";
pub const TOAST: &str = "toast.html";
pub const UNIT_BUTTONS: &str = "unit_buttons.html";
pub const HISTORY: &str = "history.html";
pub const LOADING: &str = "loading.html";
pub const EMPTY: &str = "empty.html";
pub const SUGGESTIONS: &str = "suggestions.html";
pub const FORECAST_CARDS: &str = "forecast_cards.html";
pub const WEATHER: &str = "weather.html";
pub const CAROUSEL: &str = "carousel.html";

const SOURCES: &[(&str, &str)] = &[
    (PAGE, include_str!("templates/page.html.jinja")),
    (TOAST, include_str!("templates/toast.html.jinja")),
    (UNIT_BUTTONS, include_str!("templates/unit_buttons.html.jinja")),
    (HISTORY, include_str!("templates/history.html.jinja")),
    (LOADING, include_str!("templates/loading.html.jinja")),
    (EMPTY, include_str!("templates/empty.html.jinja")),
    (SUGGESTIONS, include_str!("templates/suggestions.html.jinja")),
    (FORECAST_CARDS, include_str!("templates/forecast_cards.html.jinja")),
    (WEATHER, include_str!("templates/weather.html.jinja")),
    (CAROUSEL, include_str!("templates/carousel.html.jinja")),
];

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        for &(name, source) in SOURCES {
            // a template that fails to parse surfaces as "not found" at render time
            if let Err(e) = env.add_template(name, source) {
                tracing::error!("Failed to add template {}: {:#}", name, e);
            }
        }
        env
    })
}

/// Render the named template with `ctx`
pub fn render<S: Serialize>(name: &str, ctx: S) -> Result<String, minijinja::Error> {
    environment().get_template(name)?.render(ctx)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use minijinja::context;

    #[test]
    fn test_every_template_parses() {
        for (name, _) in SOURCES {
            assert!(environment().get_template(name).is_ok(), "{name} failed to parse");
        }
    }

    #[test]
    fn test_values_are_escaped() {
        let html = render(
            TOAST,
            context! { icon => "✕", message => r#"<b>São & "Paulo""# },
        )
        .unwrap();
        assert_eq!(
            html,
            "<span>✕</span>&lt;b&gt;São &amp; &quot;Paulo&quot;"
        );
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        assert!(render("missing.html", context! {}).is_err());
    }
}
