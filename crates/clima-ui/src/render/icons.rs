//! Inline SVG icons.

use clima_weather::Theme;

const VIEWBOX: &str = r#"viewBox="0 0 64 64""#;

const SUN: &str = r##"<svg viewBox="0 0 64 64" fill="none" xmlns="http://www.w3.org/2000/svg"><circle cx="32" cy="32" r="13" fill="#FFD54F"/><circle cx="32" cy="32" r="10" fill="#FFEB3B"/><line x1="32" y1="5" x2="32" y2="15" stroke="#FFA000" stroke-width="4" stroke-linecap="round"/><line x1="32" y1="49" x2="32" y2="59" stroke="#FFA000" stroke-width="4" stroke-linecap="round"/><line x1="5" y1="32" x2="15" y2="32" stroke="#FFA000" stroke-width="4" stroke-linecap="round"/><line x1="49" y1="32" x2="59" y2="32" stroke="#FFA000" stroke-width="4" stroke-linecap="round"/><line x1="12.8" y1="12.8" x2="19.9" y2="19.9" stroke="#FFA000" stroke-width="4" stroke-linecap="round"/><line x1="44.1" y1="44.1" x2="51.2" y2="51.2" stroke="#FFA000" stroke-width="4" stroke-linecap="round"/><line x1="51.2" y1="12.8" x2="44.1" y2="19.9" stroke="#FFA000" stroke-width="4" stroke-linecap="round"/><line x1="19.9" y1="44.1" x2="12.8" y2="51.2" stroke="#FFA000" stroke-width="4" stroke-linecap="round"/></svg>"##;

const CLOUD: &str = r##"<svg viewBox="0 0 64 64" fill="none" xmlns="http://www.w3.org/2000/svg"><circle cx="20" cy="30" r="12" fill="#B0BEC5"/><circle cx="34" cy="26" r="14" fill="#90A4AE"/><circle cx="46" cy="32" r="10" fill="#B0BEC5"/><rect x="8" y="32" width="48" height="14" rx="7" fill="#90A4AE"/></svg>"##;

const CLOUD_RAIN: &str = r##"<svg viewBox="0 0 64 64" fill="none" xmlns="http://www.w3.org/2000/svg"><circle cx="20" cy="24" r="10" fill="#607D8B"/><circle cx="34" cy="20" r="13" fill="#546E7A"/><circle cx="46" cy="26" r="9" fill="#607D8B"/><rect x="10" y="26" width="44" height="12" rx="6" fill="#607D8B"/><line x1="20" y1="44" x2="17" y2="56" stroke="#42A5F5" stroke-width="3" stroke-linecap="round"/><line x1="31" y1="44" x2="28" y2="56" stroke="#42A5F5" stroke-width="3" stroke-linecap="round"/><line x1="42" y1="44" x2="39" y2="56" stroke="#42A5F5" stroke-width="3" stroke-linecap="round"/></svg>"##;

const CLOUD_DRIZZLE: &str = r##"<svg viewBox="0 0 64 64" fill="none" xmlns="http://www.w3.org/2000/svg"><circle cx="20" cy="24" r="10" fill="#78909C"/><circle cx="34" cy="20" r="13" fill="#607D8B"/><circle cx="46" cy="26" r="9" fill="#78909C"/><rect x="10" y="26" width="44" height="12" rx="6" fill="#78909C"/><line x1="20" y1="44" x2="18" y2="51" stroke="#90CAF9" stroke-width="2.5" stroke-linecap="round"/><line x1="30" y1="46" x2="28" y2="53" stroke="#90CAF9" stroke-width="2.5" stroke-linecap="round"/><line x1="40" y1="44" x2="38" y2="51" stroke="#90CAF9" stroke-width="2.5" stroke-linecap="round"/></svg>"##;

const CLOUD_SNOW: &str = r##"<svg viewBox="0 0 64 64" fill="none" xmlns="http://www.w3.org/2000/svg"><circle cx="20" cy="24" r="10" fill="#B0BEC5"/><circle cx="34" cy="20" r="13" fill="#90A4AE"/><circle cx="46" cy="26" r="9" fill="#B0BEC5"/><rect x="10" y="26" width="44" height="12" rx="6" fill="#B0BEC5"/><circle cx="20" cy="48" r="3" fill="#E3F2FD"/><circle cx="32" cy="52" r="3" fill="#E3F2FD"/><circle cx="44" cy="48" r="3" fill="#E3F2FD"/><circle cx="26" cy="56" r="2.5" fill="#90CAF9"/><circle cx="38" cy="56" r="2.5" fill="#90CAF9"/></svg>"##;

const CLOUD_FOG: &str = r##"<svg viewBox="0 0 64 64" fill="none" xmlns="http://www.w3.org/2000/svg"><rect x="8" y="14" width="48" height="6" rx="3" fill="#CFD8DC" opacity="0.8"/><rect x="14" y="26" width="36" height="6" rx="3" fill="#B0BEC5" opacity="0.9"/><rect x="8" y="38" width="48" height="6" rx="3" fill="#CFD8DC" opacity="0.8"/><rect x="14" y="50" width="36" height="6" rx="3" fill="#B0BEC5" opacity="0.7"/></svg>"##;

const CLOUD_LIGHTNING: &str = r##"<svg viewBox="0 0 64 64" fill="none" xmlns="http://www.w3.org/2000/svg"><circle cx="18" cy="22" r="10" fill="#455A64"/><circle cx="32" cy="18" r="13" fill="#37474F"/><circle cx="46" cy="24" r="9" fill="#455A64"/><rect x="8" y="24" width="48" height="12" rx="6" fill="#455A64"/><polygon points="35,34 26,50 33,50 24,64 43,42 36,42" fill="#FFD600"/></svg>"##;

pub const PIN: &str = r#"<svg width="12" height="12" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2.5" stroke-linecap="round"><path d="M12 2C8.13 2 5 5.13 5 9c0 5.25 7 13 7 13s7-7.75 7-13c0-3.87-3.13-7-7-7z"/><circle cx="12" cy="9" r="2.5"/></svg>"#;

pub const SUGGESTION_PIN: &str = r#"<svg class="pin" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2.5" stroke-linecap="round"><path d="M12 2C8.13 2 5 5.13 5 9c0 5.25 7 13 7 13s7-7.75 7-13c0-3.87-3.13-7-7-7z"/><circle cx="12" cy="9" r="2.5"/></svg>"#;

pub const CHIP_MAX: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round"><path d="M12 2l2.4 7.4H22l-6.2 4.5 2.4 7.4L12 17l-6.2 4.3 2.4-7.4L2 9.4h7.6z"/></svg>"#;
pub const CHIP_MIN: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round"><path d="M12 22l2.4-7.4H22l-6.2-4.5 2.4-7.4L12 7 5.8 2.7l2.4 7.4L2 14.6h7.6z"/></svg>"#;
pub const CHIP_WIND: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round"><path d="M17.7 7.7a2.5 2.5 0 1 1 1.8 4.3H2"/><path d="M9.6 4.6A2 2 0 1 1 11 8H2"/><path d="M12.6 19.4A2 2 0 1 0 14 16H2"/></svg>"#;
pub const CHIP_FEELS: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round"><path d="M12 2v10M12 22v-3"/><path d="M12 17a5 5 0 1 0 0-10 5 5 0 0 0 0 10z"/></svg>"#;
pub const CHIP_HUMIDITY: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round"><path d="M12 22a7 7 0 0 0 7-7c0-2-1-3.9-3-5.5s-3.5-4-4-6.5c-.5 2.5-2 4.9-4 6.5C6 11.1 5 13 5 15a7 7 0 0 0 7 7z"/></svg>"#;
pub const CHIP_CLOCK: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round"><circle cx="12" cy="12" r="10"/><polyline points="12 6 12 12 16 14"/></svg>"#;

pub const ARROW_PREV: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2.5" stroke-linecap="round" stroke-linejoin="round"><polyline points="15 18 9 12 15 6"/></svg>"#;
pub const ARROW_NEXT: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2.5" stroke-linecap="round" stroke-linejoin="round"><polyline points="9 18 15 12 9 6"/></svg>"#;

fn svg_for(theme: Theme) -> &'static str {
    match theme.icon_name() {
        "cloud" => CLOUD,
        "cloud_fog" => CLOUD_FOG,
        "cloud_drizzle" => CLOUD_DRIZZLE,
        "cloud_rain" => CLOUD_RAIN,
        "cloud_snow" => CLOUD_SNOW,
        "cloud_lightning" => CLOUD_LIGHTNING,
        _ => SUN,
    }
}

/// Theme icon rendered at `size` pixels square
pub fn icon(theme: Theme, size: u32) -> String {
    svg_for(theme).replacen(
        VIEWBOX,
        &format!(r#"{VIEWBOX} width="{size}" height="{size}""#),
        1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_theme_has_distinct_icon() {
        let icons: std::collections::HashSet<_> =
            Theme::ALL.iter().map(|t| svg_for(*t)).collect();
        assert_eq!(icons.len(), Theme::ALL.len());
    }

    #[test]
    fn test_icon_is_sized() {
        let svg = icon(Theme::Stormy, 38);
        assert!(svg.contains(r#"viewBox="0 0 64 64" width="38" height="38""#));
        assert!(svg.contains("#FFD600"));
    }
}
