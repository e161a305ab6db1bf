//! The document the dashboard renders into.
//!
//! A page is a fixed set of regions, each replaced wholesale by the
//! renderer, plus the few bits of state that live outside any region
//! (body class, input value, dropdown visibility, toast timer).
//! [`crate::render::document`] serializes it.

use std::collections::BTreeMap;

use tokio::time::Instant;

/// Slot inside the weather view where the carousel controls are spliced in
pub const CAROUSEL_SLOT: &str = "<!--carousel-->";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    Toast,
    UnitButtons,
    History,
    Suggestions,
    WeatherContent,
    ForecastCards,
    Carousel,
}

impl Region {
    pub fn element_id(&self) -> &'static str {
        match self {
            Region::Toast => "toast",
            Region::UnitButtons => "unit-toggle",
            Region::History => "history-row",
            Region::Suggestions => "suggestions",
            Region::WeatherContent => "weather-content",
            Region::ForecastCards => "forecast-scroll",
            Region::Carousel => "carousel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Default,
    Success,
    Error,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Default => "ℹ",
            ToastKind::Success => "✓",
            ToastKind::Error => "✕",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Default => "default",
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub hide_at: Instant,
}

#[derive(Debug, Default)]
pub struct Page {
    regions: BTreeMap<Region, String>,
    body_class: String,
    suggestions_visible: bool,
    input_value: String,
    toast: Option<Toast>,
    toast_visible: bool,
    revision: u64,
}

impl Page {
    pub fn new() -> Self {
        Self {
            body_class: "theme-sunny".to_string(),
            ..Self::default()
        }
    }

    /// Replace a region's markup
    pub fn replace(&mut self, region: Region, html: String) {
        self.regions.insert(region, html);
        self.touch();
    }

    pub fn clear(&mut self, region: Region) {
        if self.regions.remove(&region).is_some() {
            self.touch();
        }
    }

    pub fn region(&self, region: Region) -> &str {
        self.regions.get(&region).map_or("", String::as_str)
    }

    pub fn body_class(&self) -> &str {
        &self.body_class
    }

    pub fn set_body_class(&mut self, class: String) {
        if self.body_class != class {
            self.body_class = class;
            self.touch();
        }
    }

    pub fn input_value(&self) -> &str {
        &self.input_value
    }

    pub fn set_input_value(&mut self, value: &str) {
        if self.input_value != value {
            self.input_value = value.to_string();
            self.touch();
        }
    }

    pub fn suggestions_visible(&self) -> bool {
        self.suggestions_visible
    }

    pub fn set_suggestions_visible(&mut self, visible: bool) {
        if self.suggestions_visible != visible {
            self.suggestions_visible = visible;
            self.touch();
        }
    }

    /// Show a toast until `hide_at`, replacing any toast still on screen
    pub fn set_toast(&mut self, toast: Toast, html: String) {
        self.toast = Some(toast);
        self.toast_visible = true;
        self.replace(Region::Toast, html);
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn toast_visible(&self) -> bool {
        self.toast_visible
    }

    /// When the visible toast is due to hide
    pub fn toast_deadline(&self) -> Option<Instant> {
        self.toast
            .as_ref()
            .filter(|_| self.toast_visible)
            .map(|t| t.hide_at)
    }

    /// Hide the toast once its timer has run out. Returns true if it changed.
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        match self.toast_deadline() {
            Some(deadline) if now >= deadline => {
                self.toast_visible = false;
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// Bumped on every visible change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
