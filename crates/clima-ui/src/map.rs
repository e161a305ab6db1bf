//! Map card: a single persistent map widget with one pulsing marker.

use std::sync::Arc;

use clima_core::MapConfig;
use clima_weather::Coordinates;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Pulsing blue dot used for the location marker
pub const MARKER_HTML: &str = r#"<div style="width:20px;height:20px;background:#1E88E5;border:3px solid white;border-radius:50%;box-shadow:0 2px 10px rgba(30,136,229,0.7);position:relative;"><div style="position:absolute;inset:-6px;border:2px solid rgba(30,136,229,0.4);border-radius:50%;animation:rippleMap 1.8s ease-in-out infinite;"></div></div>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl From<&MapConfig> for TileLayer {
    fn from(config: &MapConfig) -> Self {
        Self {
            url_template: config.tile_url.clone(),
            attribution: config.attribution.clone(),
            max_zoom: config.max_zoom,
        }
    }
}

/// The third-party map the adapter drives
pub trait MapWidget: Send {
    /// Build the map centred on `center`; clicks are reported on `on_click`
    fn create(
        &mut self,
        center: Coordinates,
        zoom: u8,
        tiles: &TileLayer,
        on_click: mpsc::UnboundedSender<Coordinates>,
    );
    fn set_view(&mut self, center: Coordinates, zoom: u8);
    fn add_marker(&mut self, at: Coordinates, icon_html: &str) -> MarkerId;
    fn remove_marker(&mut self, marker: MarkerId);
}

pub struct MapAdapter<W: MapWidget> {
    widget: W,
    tiles: TileLayer,
    zoom: u8,
    created: bool,
    marker: Option<MarkerId>,
}

impl<W: MapWidget> MapAdapter<W> {
    pub fn new(widget: W, config: &MapConfig) -> Self {
        Self {
            widget,
            tiles: TileLayer::from(config),
            zoom: config.zoom,
            created: false,
            marker: None,
        }
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Create the map on first use, otherwise just re-centre it. Either way
    /// the marker moves to the new position.
    pub fn init_map(
        &mut self,
        latitude: f64,
        longitude: f64,
        on_click: &mpsc::UnboundedSender<Coordinates>,
    ) {
        let center = Coordinates::new(latitude, longitude);
        if self.created {
            self.widget.set_view(center, self.zoom);
        } else {
            self.widget
                .create(center, self.zoom, &self.tiles, on_click.clone());
            self.created = true;
            tracing::info!("Map created at {:.4}, {:.4}", latitude, longitude);
        }
        self.set_marker(latitude, longitude);
    }

    /// Replace the marker
    pub fn set_marker(&mut self, latitude: f64, longitude: f64) {
        if let Some(old) = self.marker.take() {
            self.widget.remove_marker(old);
        }
        let id = self
            .widget
            .add_marker(Coordinates::new(latitude, longitude), MARKER_HTML);
        self.marker = Some(id);
    }
}

#[derive(Debug, Default)]
pub struct HeadlessMapState {
    pub center: Option<Coordinates>,
    pub zoom: u8,
    pub tiles: Option<TileLayer>,
    pub creations: usize,
    pub markers: Vec<(MarkerId, Coordinates)>,
    next_marker: u64,
    on_click: Option<mpsc::UnboundedSender<Coordinates>>,
}

/// Map widget without a display. Clones share state, so a caller can keep
/// a handle to inspect the map or simulate clicks.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMap {
    state: Arc<Mutex<HeadlessMapState>>,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a click. Returns false when the map has not been created yet.
    pub fn click(&self, latitude: f64, longitude: f64) -> bool {
        let state = self.state.lock();
        match &state.on_click {
            Some(tx) => tx.send(Coordinates::new(latitude, longitude)).is_ok(),
            None => false,
        }
    }

    pub fn center(&self) -> Option<Coordinates> {
        self.state.lock().center
    }

    pub fn creations(&self) -> usize {
        self.state.lock().creations
    }

    pub fn markers(&self) -> Vec<(MarkerId, Coordinates)> {
        self.state.lock().markers.clone()
    }
}

impl MapWidget for HeadlessMap {
    fn create(
        &mut self,
        center: Coordinates,
        zoom: u8,
        tiles: &TileLayer,
        on_click: mpsc::UnboundedSender<Coordinates>,
    ) {
        let mut state = self.state.lock();
        state.center = Some(center);
        state.zoom = zoom;
        state.tiles = Some(tiles.clone());
        state.creations += 1;
        state.on_click = Some(on_click);
    }

    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        let mut state = self.state.lock();
        state.center = Some(center);
        state.zoom = zoom;
    }

    fn add_marker(&mut self, at: Coordinates, _icon_html: &str) -> MarkerId {
        let mut state = self.state.lock();
        state.next_marker += 1;
        let id = MarkerId(state.next_marker);
        state.markers.push((id, at));
        id
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.state.lock().markers.retain(|(id, _)| *id != marker);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_map_is_created_once_and_recentred() {
        let map = HeadlessMap::new();
        let mut adapter = MapAdapter::new(map.clone(), &MapConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        adapter.init_map(38.72, -9.14, &tx);
        adapter.init_map(41.15, -8.61, &tx);

        assert!(adapter.is_created());
        assert_eq!(map.creations(), 1);
        assert_eq!(map.center(), Some(Coordinates::new(41.15, -8.61)));
        assert_eq!(map.state.lock().zoom, 11);
    }

    #[test]
    fn test_only_one_marker_at_a_time() {
        let map = HeadlessMap::new();
        let mut adapter = MapAdapter::new(map.clone(), &MapConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        adapter.init_map(38.72, -9.14, &tx);
        adapter.set_marker(40.0, -8.0);

        let markers = map.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].1, Coordinates::new(40.0, -8.0));
    }

    #[test]
    fn test_clicks_are_reported() {
        let map = HeadlessMap::new();
        assert!(!map.click(1.0, 2.0));

        let mut adapter = MapAdapter::new(map.clone(), &MapConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        adapter.init_map(38.72, -9.14, &tx);

        assert!(map.click(38.7, -9.2));
        assert_eq!(rx.try_recv().unwrap(), Coordinates::new(38.7, -9.2));
    }

    #[test]
    fn test_tile_layer_from_config() {
        let map = HeadlessMap::new();
        let mut adapter = MapAdapter::new(map.clone(), &MapConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        adapter.init_map(0.0, 0.0, &tx);

        let tiles = map.state.lock().tiles.clone().unwrap();
        assert!(tiles.url_template.contains("openstreetmap"));
        assert_eq!(tiles.max_zoom, 18);
    }
}
