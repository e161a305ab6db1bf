//! The dashboard: owns application state and the page, turns UI events into
//! requests, and applies their results.
//!
//! Everything runs on one task. Network calls are spawned through
//! [`crate::services`] and report back on an mpsc channel; timers (toast,
//! debounce, carousel) are plain deadlines polled by [`Dashboard::run`].
//! Each user-initiated load takes a fresh request token and results carrying
//! an older token are dropped, so a slow response can never replace a newer one.

use std::sync::Arc;
use std::time::Duration;

use clima_core::{AppError, Config, LocationError, WeatherError};
use clima_weather::{
    cache_key, Coordinates, LocationSource, Place, TemperatureUnit, WeatherCache,
    WeatherProvider, WeatherResponse,
};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::atmosphere::Scene;
use crate::carousel::{Carousel, CarouselSettings};
use crate::debounce::Debouncer;
use crate::map::{MapAdapter, MapWidget};
use crate::page::{Page, ToastKind};
use crate::render::{self, RenderContext, RenderError};
use crate::services::{self, LoadOrigin, RequestToken, WeatherServiceMessage};
use crate::state::AppState;
use crate::storage::KeyValueStore;

pub const EMPTY_QUERY_MESSAGE: &str = "Digite o nome de uma cidade!";
pub const CONNECTION_ERROR_MESSAGE: &str = "Erro de conexão. Tente novamente.";

/// Everything the page can ask the dashboard to do
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The search box now contains this text
    Input(String),
    KeyEnter,
    KeyEscape,
    SearchClicked,
    /// Click anywhere outside the search field
    OutsideClick,
    PickSuggestion(usize),
    PickHistory(String),
    UseLocation,
    ToggleUnit(TemperatureUnit),
    MapClick { latitude: f64, longitude: f64 },
    CarouselPrev,
    CarouselNext,
    CarouselDot(usize),
    CarouselScroll(f64),
    CarouselHoverEnter,
    CarouselHoverLeave,
    CarouselTouchStart,
    CarouselTouchEnd,
    Resize { width: f64, height: f64 },
}

pub struct Dashboard<W: MapWidget> {
    config: Arc<Config>,
    provider: Arc<WeatherProvider>,
    location: Arc<dyn LocationSource>,
    state: AppState,
    page: Page,
    map: MapAdapter<W>,
    carousel: Option<Carousel>,
    carousel_settings: CarouselSettings,
    debouncer: Debouncer<String>,
    suggestions: Vec<Place>,
    generation: RequestToken,
    suggest_generation: RequestToken,
    in_flight: usize,
    service_tx: mpsc::UnboundedSender<WeatherServiceMessage>,
    service_rx: mpsc::UnboundedReceiver<WeatherServiceMessage>,
    click_tx: mpsc::UnboundedSender<Coordinates>,
    click_rx: mpsc::UnboundedReceiver<Coordinates>,
    scene_tx: watch::Sender<Scene>,
    page_tx: watch::Sender<String>,
    published_revision: Option<u64>,
}

impl<W: MapWidget> Dashboard<W> {
    /// Build the dashboard and render the initial (welcome) page
    pub fn new(
        config: Arc<Config>,
        provider: Arc<WeatherProvider>,
        location: Arc<dyn LocationSource>,
        store: Box<dyn KeyValueStore>,
        widget: W,
    ) -> Self {
        let cache = WeatherCache::new(chrono::Duration::seconds(config.cache.ttl_secs as i64));
        let state = AppState::load(store, cache, config.search.history_limit);
        let map = MapAdapter::new(widget, &config.map);
        let carousel_settings = CarouselSettings::from(&config.carousel);
        let debouncer = Debouncer::new(Duration::from_millis(config.search.debounce_ms));
        let (service_tx, service_rx) = mpsc::unbounded_channel();
        let (click_tx, click_rx) = mpsc::unbounded_channel();
        let (scene_tx, _) = watch::channel(Scene::new(
            f64::from(config.ui.viewport_width),
            f64::from(config.ui.viewport_height),
        ));
        let (page_tx, _) = watch::channel(String::new());

        let mut dashboard = Self {
            config,
            provider,
            location,
            state,
            page: Page::new(),
            map,
            carousel: None,
            carousel_settings,
            debouncer,
            suggestions: Vec::new(),
            generation: 0,
            suggest_generation: 0,
            in_flight: 0,
            service_tx,
            service_rx,
            click_tx,
            click_rx,
            scene_tx,
            page_tx,
            published_revision: None,
        };

        report(render::render_unit_buttons(&mut dashboard.page, dashboard.state.unit()));
        report(render::render_history(&mut dashboard.page, dashboard.state.history()));
        report(render::show_empty(&mut dashboard.page));
        dashboard.publish();
        dashboard
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn map(&self) -> &MapAdapter<W> {
        &self.map
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    pub fn suggestions(&self) -> &[Place] {
        &self.suggestions
    }

    /// Token of the most recent load
    pub fn generation(&self) -> RequestToken {
        self.generation
    }

    /// Number of spawned requests that have not reported back yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Serialized page, updated after every visible change
    pub fn subscribe_page(&self) -> watch::Receiver<String> {
        self.page_tx.subscribe()
    }

    /// Theme and viewport for the background animation
    pub fn subscribe_scene(&self) -> watch::Receiver<Scene> {
        self.scene_tx.subscribe()
    }

    /// Dispatch one UI event
    pub fn handle_event(&mut self, event: UiEvent, now: Instant) {
        tracing::trace!("UI event: {:?}", event);
        match event {
            UiEvent::Input(text) => self.on_input(text, now),
            UiEvent::KeyEnter | UiEvent::SearchClicked => {
                self.debouncer.cancel();
                self.dismiss_suggestions();
                self.search_from_input(now);
            }
            UiEvent::KeyEscape | UiEvent::OutsideClick => self.dismiss_suggestions(),
            UiEvent::PickSuggestion(index) => self.pick_suggestion(index, now),
            UiEvent::PickHistory(city) => {
                self.debouncer.cancel();
                self.dismiss_suggestions();
                self.page.set_input_value(&city);
                self.search(city, LoadOrigin::History);
            }
            UiEvent::UseLocation => self.use_location(now),
            UiEvent::ToggleUnit(unit) => self.toggle_unit(unit, now),
            UiEvent::MapClick {
                latitude,
                longitude,
            } => self.on_map_click(Coordinates::new(latitude, longitude)),
            UiEvent::CarouselPrev => self.with_carousel(|c| c.prev(now)),
            UiEvent::CarouselNext => self.with_carousel(|c| c.next(now)),
            UiEvent::CarouselDot(dot) => self.with_carousel(|c| c.select_dot(dot, now)),
            UiEvent::CarouselScroll(offset) => self.with_carousel(|c| c.scroll_to(offset)),
            UiEvent::CarouselHoverEnter => self.with_carousel(Carousel::hover_enter),
            UiEvent::CarouselHoverLeave => self.with_carousel(|c| c.hover_leave(now)),
            UiEvent::CarouselTouchStart => self.with_carousel(Carousel::touch_start),
            UiEvent::CarouselTouchEnd => self.with_carousel(|c| c.touch_end(now)),
            UiEvent::Resize { width, height } => {
                self.scene_tx.send_modify(|scene| {
                    scene.width = width;
                    scene.height = height;
                });
            }
        }
        self.publish();
    }

    /// Apply the result of a spawned request
    pub fn handle_message(&mut self, message: WeatherServiceMessage, now: Instant) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match message {
            WeatherServiceMessage::SearchDone {
                token,
                query,
                origin,
                result,
            } => {
                if self.is_stale(token) {
                    return;
                }
                match result {
                    Ok(places) => match places.into_iter().next() {
                        Some(place) => self.load_weather(place, origin, token, now),
                        None => {
                            let err = AppError::from(WeatherError::LocationNotFound(query));
                            tracing::info!("{}", err);
                            report(render::show_empty(&mut self.page));
                            self.toast(&err.user_message(), ToastKind::Error, now);
                        }
                    },
                    Err(e) => {
                        tracing::error!("Search for '{}' failed: {}", query, AppError::from(e));
                        report(render::show_empty(&mut self.page));
                        self.toast(CONNECTION_ERROR_MESSAGE, ToastKind::Error, now);
                    }
                }
            }
            WeatherServiceMessage::SuggestionsDone { token, result } => {
                if token != self.suggest_generation {
                    tracing::debug!("Dropping stale suggestions (token {})", token);
                    return;
                }
                match result {
                    Ok(places) => {
                        report(render::render_suggestions(&mut self.page, &places));
                        self.suggestions = places;
                    }
                    Err(e) => {
                        tracing::debug!("Suggestions failed: {}", e);
                        self.suggestions.clear();
                        render::hide_suggestions(&mut self.page);
                    }
                }
            }
            WeatherServiceMessage::WeatherDone {
                token,
                place,
                key,
                origin,
                result,
            } => match result {
                Ok(data) => {
                    self.state.set_cache_weather(&key, data.clone());
                    if self.is_stale(token) {
                        return;
                    }
                    self.commit(place, data, origin, now);
                }
                Err(e) => {
                    if self.is_stale(token) {
                        return;
                    }
                    tracing::error!(
                        "Failed to load weather for {}: {}",
                        place.name,
                        AppError::from(e)
                    );
                    report(render::show_empty(&mut self.page));
                    self.toast(origin.failure_message(), ToastKind::Error, now);
                }
            },
            WeatherServiceMessage::PlaceResolved {
                token,
                place,
                origin,
            } => {
                if self.is_stale(token) {
                    return;
                }
                self.load_weather(place, origin, token, now);
            }
            WeatherServiceMessage::LocationDone { token, result } => {
                if self.is_stale(token) {
                    return;
                }
                match result {
                    Ok(position) => {
                        self.in_flight += 1;
                        services::request_reverse(
                            &self.service_tx,
                            self.provider.clone(),
                            token,
                            position,
                            LoadOrigin::Geolocation,
                        );
                    }
                    Err(e) => {
                        let message = AppError::from(e).user_message();
                        self.toast(&message, ToastKind::Error, now);
                        report(render::show_empty(&mut self.page));
                    }
                }
            }
        }
        self.publish();
    }

    /// Fire due timers
    pub fn tick(&mut self, now: Instant) {
        self.page.expire_toast(now);

        if let Some(query) = self.debouncer.take_due(now) {
            self.suggest_generation += 1;
            self.in_flight += 1;
            services::request_suggestions(
                &self.service_tx,
                self.provider.clone(),
                self.suggest_generation,
                query,
                self.config.search.suggestion_count,
            );
        }

        let advanced = self
            .carousel
            .as_mut()
            .is_some_and(|carousel| carousel.tick(now));
        if advanced {
            self.render_carousel();
        }
        self.publish();
    }

    /// Earliest pending timer
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.page.toast_deadline(),
            self.debouncer.deadline(),
            self.carousel.as_ref().and_then(Carousel::next_deadline),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Wait until every spawned request has reported back
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.service_rx.recv().await {
                Some(message) => self.handle_message(message, Instant::now()),
                None => break,
            }
        }
    }

    /// Event loop. Returns the dashboard once `cancel` fires or `events` closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<UiEvent>, cancel: CancellationToken) -> Self {
        tracing::info!("Dashboard running");
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event, Instant::now()),
                    None => break,
                },
                Some(message) = self.service_rx.recv() => {
                    self.handle_message(message, Instant::now());
                }
                Some(at) = self.click_rx.recv() => {
                    self.handle_event(
                        UiEvent::MapClick { latitude: at.latitude, longitude: at.longitude },
                        Instant::now(),
                    );
                }
                _ = sleep_until(deadline) => self.tick(Instant::now()),
            }
        }
        tracing::info!("Dashboard stopped");
        self
    }

    fn on_input(&mut self, text: String, now: Instant) {
        self.page.set_input_value(&text);
        let query = text.trim();
        if query.chars().count() < self.config.search.min_query_chars {
            self.debouncer.cancel();
            self.dismiss_suggestions();
            return;
        }
        self.debouncer.schedule(query.to_string(), now);
    }

    /// Hide and forget the dropdown; a lookup already on the wire must not reopen it
    fn dismiss_suggestions(&mut self) {
        self.suggest_generation += 1;
        self.suggestions.clear();
        render::hide_suggestions(&mut self.page);
    }

    fn search_from_input(&mut self, now: Instant) {
        let query = self.page.input_value().trim().to_string();
        if query.is_empty() {
            self.toast(EMPTY_QUERY_MESSAGE, ToastKind::Error, now);
            return;
        }
        self.search(query, LoadOrigin::Search);
    }

    fn search(&mut self, query: String, origin: LoadOrigin) {
        report(render::show_loading(&mut self.page));
        let token = self.next_token();
        tracing::info!("Searching for '{}' ({:?})", query, origin);
        self.in_flight += 1;
        services::request_search(
            &self.service_tx,
            self.provider.clone(),
            token,
            query,
            self.config.search.result_count,
            origin,
        );
    }

    fn pick_suggestion(&mut self, index: usize, now: Instant) {
        let Some(place) = self.suggestions.get(index).cloned() else {
            tracing::warn!("No suggestion at index {}", index);
            return;
        };
        self.page.set_input_value(&place.name);
        self.dismiss_suggestions();
        report(render::show_loading(&mut self.page));
        let token = self.next_token();
        self.load_weather(place, LoadOrigin::Suggestion, token, now);
    }

    fn use_location(&mut self, now: Instant) {
        if !self.location.is_supported() {
            let message = AppError::from(LocationError::Unsupported).user_message();
            self.toast(&message, ToastKind::Error, now);
            return;
        }
        report(render::show_loading(&mut self.page));
        let token = self.next_token();
        self.in_flight += 1;
        services::request_location(&self.service_tx, self.location.clone(), token);
    }

    fn on_map_click(&mut self, at: Coordinates) {
        tracing::info!("Map clicked at {:.4}, {:.4}", at.latitude, at.longitude);
        report(render::show_loading(&mut self.page));
        let token = self.next_token();
        self.in_flight += 1;
        services::request_reverse(
            &self.service_tx,
            self.provider.clone(),
            token,
            at,
            LoadOrigin::MapClick,
        );
    }

    fn toggle_unit(&mut self, unit: TemperatureUnit, now: Instant) {
        self.state.set_unit(unit);
        report(render::render_unit_buttons(&mut self.page, unit));
        let current = self
            .state
            .current_place()
            .cloned()
            .zip(self.state.current_data().cloned());
        if let Some((place, data)) = current {
            self.render_view(&place, &data, now);
        }
    }

    /// Use the cached forecast when fresh, otherwise fetch it under `token`
    fn load_weather(&mut self, place: Place, origin: LoadOrigin, token: RequestToken, now: Instant) {
        let key = cache_key(place.latitude, place.longitude);
        if let Some(data) = self.state.get_cache_weather(&key).cloned() {
            tracing::debug!("Cache hit for {} ({})", place.name, key);
            self.commit(place, data, origin, now);
            return;
        }

        self.in_flight += 1;
        services::request_weather(
            &self.service_tx,
            self.provider.clone(),
            token,
            place,
            key,
            origin,
        );
    }

    fn commit(&mut self, place: Place, data: WeatherResponse, origin: LoadOrigin, now: Instant) {
        self.state.set_current(place.clone(), data.clone());
        self.state.add_to_history(&place.name);

        self.render_view(&place, &data, now);
        report(render::render_history(&mut self.page, self.state.history()));
        if origin == LoadOrigin::MapClick {
            self.page.set_input_value(&place.name);
        }
        self.toast(&format!("{} carregado!", place.name), ToastKind::Success, now);
        tracing::info!("Loaded weather for {}", place.name);
    }

    /// Full weather view plus its side effects: theme, map and a fresh carousel
    fn render_view(&mut self, place: &Place, data: &WeatherResponse, now: Instant) {
        let ctx = RenderContext {
            unit: self.state.unit(),
            now: chrono::Local::now().naive_local(),
        };
        let theme = match render::render_weather(&mut self.page, &ctx, data, place) {
            Ok(theme) => theme,
            Err(e) => {
                tracing::error!("Failed to render weather for {}: {:#}", place.name, e);
                return;
            }
        };
        self.scene_tx.send_if_modified(|scene| {
            if scene.theme == Some(theme) {
                false
            } else {
                scene.theme = Some(theme);
                true
            }
        });

        self.map
            .init_map(place.latitude, place.longitude, &self.click_tx);

        self.carousel = Some(Carousel::new(
            data.daily.len(),
            self.carousel_settings.clone(),
            now,
        ));
        self.render_carousel();
    }

    fn with_carousel(&mut self, f: impl FnOnce(&mut Carousel)) {
        if let Some(carousel) = self.carousel.as_mut() {
            f(carousel);
            self.render_carousel();
        }
    }

    fn render_carousel(&mut self) {
        if let Some(carousel) = &self.carousel {
            report(render::render_carousel(&mut self.page, &carousel.view()));
        }
    }

    fn toast(&mut self, message: &str, kind: ToastKind, now: Instant) {
        let hide_at = now + Duration::from_millis(self.config.ui.toast_ms);
        report(render::show_toast(&mut self.page, message, kind, hide_at));
    }

    fn next_token(&mut self) -> RequestToken {
        self.generation += 1;
        self.generation
    }

    fn is_stale(&self, token: RequestToken) -> bool {
        let stale = token != self.generation;
        if stale {
            tracing::debug!(
                "Dropping stale result (token {}, current {})",
                token,
                self.generation
            );
        }
        stale
    }

    fn publish(&mut self) {
        let revision = self.page.revision();
        if self.published_revision == Some(revision) {
            return;
        }
        match render::document(&self.page) {
            Ok(html) => {
                self.page_tx.send_replace(html);
                self.published_revision = Some(revision);
            }
            Err(e) => tracing::error!("Failed to render page: {:#}", e),
        }
    }
}

/// Log a failed region render; the page keeps its previous markup
fn report(result: Result<(), RenderError>) {
    if let Err(e) = result {
        tracing::error!("Failed to render region: {:#}", e);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::map::HeadlessMap;
    use crate::page::Region;
    use crate::storage::MemoryStore;
    use clima_weather::{Endpoints, FixedLocation, UnsupportedLocation};

    fn offline_dashboard(location: Arc<dyn LocationSource>) -> Dashboard<HeadlessMap> {
        let provider =
            Arc::new(WeatherProvider::new(Endpoints::with_base("http://127.0.0.1:9")).unwrap());
        Dashboard::new(
            Arc::new(Config::default()),
            provider,
            location,
            Box::new(MemoryStore::new()),
            HeadlessMap::new(),
        )
    }

    #[tokio::test]
    async fn test_initial_page_is_welcome() {
        let dashboard = offline_dashboard(Arc::new(UnsupportedLocation));
        let html = dashboard.subscribe_page().borrow().clone();
        assert!(html.contains("Descubra o clima agora"));
        assert!(html.contains(r#"class="unit-btn active">°C"#));
    }

    #[tokio::test]
    async fn test_empty_search_shows_toast() {
        let mut dashboard = offline_dashboard(Arc::new(UnsupportedLocation));
        dashboard.handle_event(UiEvent::Input("   ".into()), Instant::now());
        dashboard.handle_event(UiEvent::KeyEnter, Instant::now());

        let toast = dashboard.page().toast().unwrap();
        assert_eq!(toast.message, EMPTY_QUERY_MESSAGE);
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(dashboard.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_short_input_hides_suggestions_without_lookup() {
        let mut dashboard = offline_dashboard(Arc::new(UnsupportedLocation));
        let now = Instant::now();
        dashboard.handle_event(UiEvent::Input("L".into()), now);
        assert_eq!(dashboard.next_deadline(), None);
        assert!(!dashboard.page().suggestions_visible());
        assert_eq!(dashboard.page().input_value(), "L");
    }

    #[tokio::test]
    async fn test_unsupported_geolocation_only_toasts() {
        let mut dashboard = offline_dashboard(Arc::new(UnsupportedLocation));
        dashboard.handle_event(UiEvent::UseLocation, Instant::now());

        assert_eq!(
            dashboard.page().toast().unwrap().message,
            "Geolocalização não suportada pelo navegador."
        );
        assert_eq!(dashboard.in_flight(), 0);
        assert!(dashboard
            .page()
            .region(Region::WeatherContent)
            .contains("Descubra o clima agora"));
    }

    #[tokio::test]
    async fn test_geolocation_network_failure_returns_to_empty() {
        let location = Arc::new(FixedLocation(Coordinates::new(38.72, -9.14)));
        let mut dashboard = offline_dashboard(location);
        dashboard.handle_event(UiEvent::UseLocation, Instant::now());
        assert!(dashboard
            .page()
            .region(Region::WeatherContent)
            .contains("Buscando dados climáticos…"));

        dashboard.settle().await;

        // reverse geocoding falls back to coordinates, then the forecast fails
        assert_eq!(
            dashboard.page().toast().unwrap().message,
            "Erro ao obter dados da localização."
        );
        assert!(dashboard
            .page()
            .region(Region::WeatherContent)
            .contains("Descubra o clima agora"));
        assert!(dashboard.state().history().is_empty());
    }

    #[tokio::test]
    async fn test_carousel_events_without_weather_are_ignored() {
        let mut dashboard = offline_dashboard(Arc::new(UnsupportedLocation));
        dashboard.handle_event(UiEvent::CarouselNext, Instant::now());
        assert!(dashboard.carousel().is_none());
        assert_eq!(dashboard.page().region(Region::Carousel), "");
    }

    #[tokio::test]
    async fn test_resize_updates_scene() {
        let mut dashboard = offline_dashboard(Arc::new(UnsupportedLocation));
        let scene = dashboard.subscribe_scene();
        dashboard.handle_event(
            UiEvent::Resize {
                width: 390.0,
                height: 844.0,
            },
            Instant::now(),
        );
        let scene = *scene.borrow();
        assert_eq!((scene.width, scene.height), (390.0, 844.0));
        assert_eq!(scene.theme, None);
    }
}
