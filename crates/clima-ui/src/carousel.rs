//! Paging state for the 7-day forecast strip.
//!
//! The carousel never owns a timer. The dashboard asks for
//! [`Carousel::next_deadline`], sleeps until then, and calls
//! [`Carousel::tick`].

use std::time::Duration;

use clima_core::CarouselConfig;
use tokio::time::Instant;

/// Card pitch used when the card width is unknown
pub const FALLBACK_CARD_STEP: f64 = 96.0;

/// Opacity of an arrow that cannot be pressed
pub const DISABLED_ARROW_OPACITY: f64 = 0.35;

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselSettings {
    pub autoplay: Duration,
    pub resume_after: Duration,
    pub touch_resume_after: Duration,
    pub card_width: f64,
    pub card_gap: f64,
    pub container_width: f64,
}

impl From<&CarouselConfig> for CarouselSettings {
    fn from(config: &CarouselConfig) -> Self {
        Self {
            autoplay: Duration::from_millis(config.autoplay_ms),
            resume_after: Duration::from_millis(config.resume_ms),
            touch_resume_after: Duration::from_millis(config.touch_resume_ms),
            card_width: config.card_width,
            card_gap: config.card_gap,
            container_width: config.container_width,
        }
    }
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self::from(&CarouselConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Autoplay {
    Running { next_at: Instant },
    /// `resume_at: None` waits for an explicit resume (hover leave)
    Paused { resume_at: Option<Instant> },
}

/// What the renderer needs to draw the controls
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselView {
    pub index: usize,
    pub total: usize,
    pub visible: usize,
    pub scroll_left: f64,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl CarouselView {
    pub fn arrow_opacity(disabled: bool) -> f64 {
        if disabled {
            DISABLED_ARROW_OPACITY
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct Carousel {
    total: usize,
    index: usize,
    settings: CarouselSettings,
    autoplay: Autoplay,
}

impl Carousel {
    /// A carousel over `total` cards with autoplay already running
    pub fn new(total: usize, settings: CarouselSettings, now: Instant) -> Self {
        let autoplay = Autoplay::Running {
            next_at: now + settings.autoplay,
        };
        Self {
            total,
            index: 0,
            settings,
            autoplay,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.autoplay, Autoplay::Running { .. })
    }

    /// Distance between the left edges of two neighbouring cards
    pub fn card_step(&self) -> f64 {
        if self.settings.card_width > 0.0 {
            self.settings.card_width + self.settings.card_gap
        } else {
            FALLBACK_CARD_STEP
        }
    }

    pub fn visible_count(&self) -> usize {
        let fit = (self.settings.container_width / self.card_step()).round();
        if fit.is_finite() && fit >= 1.0 {
            fit as usize
        } else {
            1
        }
    }

    pub fn max_index(&self) -> usize {
        self.total.saturating_sub(self.visible_count())
    }

    /// Jump to `index`, clamped to the valid range
    pub fn go_to(&mut self, index: i64) {
        let max = self.max_index() as i64;
        self.index = index.clamp(0, max.max(0)) as usize;
    }

    pub fn set_container_width(&mut self, width: f64) {
        self.settings.container_width = width;
        self.go_to(self.index as i64);
    }

    /// Previous page; autoplay resumes after the grace period
    pub fn prev(&mut self, now: Instant) {
        let target = self.index as i64 - self.visible_count() as i64;
        self.manual(target, now);
    }

    /// Next page; autoplay resumes after the grace period
    pub fn next(&mut self, now: Instant) {
        let target = self.index as i64 + self.visible_count() as i64;
        self.manual(target, now);
    }

    pub fn select_dot(&mut self, dot: usize, now: Instant) {
        self.manual(dot as i64, now);
    }

    fn manual(&mut self, target: i64, now: Instant) {
        self.go_to(target);
        self.autoplay = Autoplay::Paused {
            resume_at: Some(now + self.settings.resume_after),
        };
    }

    pub fn hover_enter(&mut self) {
        self.autoplay = Autoplay::Paused { resume_at: None };
    }

    pub fn hover_leave(&mut self, now: Instant) {
        self.start_autoplay(now);
    }

    pub fn touch_start(&mut self) {
        self.autoplay = Autoplay::Paused { resume_at: None };
    }

    pub fn touch_end(&mut self, now: Instant) {
        self.autoplay = Autoplay::Paused {
            resume_at: Some(now + self.settings.touch_resume_after),
        };
    }

    /// Sync the index with a manual scroll offset in pixels
    pub fn scroll_to(&mut self, offset: f64) {
        let index = (offset / self.card_step()).round();
        let index = if index.is_finite() { index as i64 } else { 0 };
        self.go_to(index);
    }

    fn start_autoplay(&mut self, now: Instant) {
        self.autoplay = Autoplay::Running {
            next_at: now + self.settings.autoplay,
        };
    }

    /// Next instant at which [`tick`](Self::tick) has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.autoplay {
            Autoplay::Running { next_at } => Some(next_at),
            Autoplay::Paused { resume_at } => resume_at,
        }
    }

    /// Advance timers up to `now`. Returns true if the index changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Autoplay::Paused {
            resume_at: Some(resume_at),
        } = self.autoplay
        {
            if now >= resume_at {
                self.start_autoplay(resume_at);
            }
        }

        let before = self.index;
        while let Autoplay::Running { next_at } = self.autoplay {
            if now < next_at {
                break;
            }
            self.advance();
            self.autoplay = Autoplay::Running {
                next_at: next_at + self.settings.autoplay,
            };
        }
        self.index != before
    }

    fn advance(&mut self) {
        let next = if self.index >= self.max_index() {
            0
        } else {
            self.index + 1
        };
        self.go_to(next as i64);
    }

    pub fn view(&self) -> CarouselView {
        CarouselView {
            index: self.index,
            total: self.total,
            visible: self.visible_count(),
            scroll_left: self.index as f64 * self.card_step(),
            prev_disabled: self.index == 0,
            next_disabled: self.index >= self.max_index(),
        }
    }
}
