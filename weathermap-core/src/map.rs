//! Map widget ownership and the single active marker.
//!
//! The widget itself (rendering, tiles, gestures) lives behind [`MapWidget`].
//! The controller only sequences calls into it: create once, keep at most
//! one marker, and route clicks out through a channel.

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::{Coordinate, SessionError};

pub const DEFAULT_CENTER: (f64, f64) = (40.7128, -74.0060);
/// Continental scale.
pub const DEFAULT_ZOOM: u8 = 4;
/// City scale, used when jumping to a search result.
pub const SEARCH_ZOOM: u8 = 10;
pub const LOADING_POPUP: &str = "Fetching weather data...";

/// Click events travel from the widget to the session over this channel.
pub type ClickSender = mpsc::UnboundedSender<Coordinate>;
pub type ClickReceiver = mpsc::UnboundedReceiver<Coordinate>;

/// Opaque handle to a marker owned by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: Coordinate::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom: DEFAULT_ZOOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl TileLayer {
    pub fn openstreetmap() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
            max_zoom: 19,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerOptions {
    pub rise_on_hover: bool,
}

/// Capabilities the controller needs from a map widget.
pub trait MapWidget: Send {
    fn add_tile_layer(&mut self, layer: TileLayer);
    fn on_click(&mut self, clicks: ClickSender);
    fn add_marker(&mut self, at: Coordinate, options: MarkerOptions) -> MarkerId;
    fn remove_marker(&mut self, marker: MarkerId);
    fn bind_popup(&mut self, marker: MarkerId, content: &str);
    fn open_popup(&mut self, marker: MarkerId);
    fn set_popup_content(&mut self, marker: MarkerId, content: &str);
    fn set_view(&mut self, center: Coordinate, zoom: u8);
    fn invalidate_size(&mut self);

    /// Resolves once the widget has been laid out in its (now visible)
    /// container and can be re-measured.
    fn settled(&self) -> BoxFuture<'static, ()> {
        Box::pin(futures::future::ready(()))
    }
}

pub trait MapWidgetFactory: Send + Sync {
    fn create(&self, options: &MapOptions) -> anyhow::Result<Box<dyn MapWidget>>;
}

struct ActiveMarker {
    id: MarkerId,
    position: Coordinate,
}

pub struct MapController {
    factory: Box<dyn MapWidgetFactory>,
    clicks: ClickSender,
    widget: Option<Box<dyn MapWidget>>,
    marker: Option<ActiveMarker>,
}

impl MapController {
    pub fn new(factory: Box<dyn MapWidgetFactory>, clicks: ClickSender) -> Self {
        Self {
            factory,
            clicks,
            widget: None,
            marker: None,
        }
    }

    /// Create the widget. Returns `Ok(false)` without touching anything if it
    /// already exists.
    pub fn initialize(&mut self) -> Result<bool, SessionError> {
        if self.widget.is_some() {
            tracing::debug!("map already initialized, ignoring");
            return Ok(false);
        }

        tracing::info!("initializing map");

        let options = MapOptions::default();
        let mut widget = self
            .factory
            .create(&options)
            .map_err(|err| SessionError::Initialization(format!("{err:#}")))?;

        widget.add_tile_layer(TileLayer::openstreetmap());
        widget.on_click(self.clicks.clone());

        self.widget = Some(widget);
        Ok(true)
    }

    pub fn is_initialized(&self) -> bool {
        self.widget.is_some()
    }

    /// Future for the deferred size recalculation, if a widget exists.
    pub fn settled(&self) -> Option<BoxFuture<'static, ()>> {
        self.widget.as_ref().map(|w| w.settled())
    }

    pub fn recalculate_size(&mut self) {
        if let Some(widget) = self.widget.as_mut() {
            widget.invalidate_size();
        }
    }

    /// Replace the marker with a new one at `at`, showing the loading popup.
    pub fn on_click(&mut self, at: Coordinate) {
        let Some(widget) = self.widget.as_mut() else {
            tracing::warn!(%at, "click before map initialization, ignoring marker");
            return;
        };

        if let Some(previous) = self.marker.take() {
            widget.remove_marker(previous.id);
        }

        let options = MarkerOptions {
            rise_on_hover: true,
        };
        let id = widget.add_marker(at, options);
        widget.bind_popup(id, LOADING_POPUP);
        widget.open_popup(id);

        self.marker = Some(ActiveMarker { id, position: at });
    }

    pub fn go_to(&mut self, center: Coordinate, zoom: u8) {
        if let Some(widget) = self.widget.as_mut() {
            widget.set_view(center, zoom);
        }
    }

    pub fn update_marker_popup(&mut self, content: &str) {
        if let (Some(widget), Some(marker)) = (self.widget.as_mut(), self.marker.as_ref()) {
            widget.set_popup_content(marker.id, content);
        }
    }

    pub fn has_marker(&self) -> bool {
        self.marker.is_some()
    }

    pub fn marker_position(&self) -> Option<Coordinate> {
        self.marker.as_ref().map(|m| m.position)
    }
}

impl std::fmt::Debug for MapController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapController")
            .field("initialized", &self.is_initialized())
            .field("marker", &self.marker_position())
            .finish()
    }
}
