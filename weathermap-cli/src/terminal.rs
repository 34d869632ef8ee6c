//! Terminal implementations of the UI capabilities the core needs.
//!
//! The "map" here has no tiles; it keeps the camera and marker state and
//! prints what a graphical widget would draw.

use chrono::Local;
use parking_lot::Mutex;
use std::sync::Arc;

use weathermap_core::{
    ClickSender, Coordinate, DisplaySink, MapWidget, MapWidgetFactory, View, ViewSurface,
    WeatherRow,
    map::{MapOptions, MarkerId, MarkerOptions, TileLayer},
};

#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl DisplaySink for TerminalDisplay {
    fn set_location_label(&self, text: &str) {
        println!("\n== {text}");
    }

    fn set_coordinates_text(&self, text: &str) {
        println!("   {text}");
    }

    fn set_loading(&self) {
        println!("   ...");
    }

    fn set_weather_rows(&self, rows: &[WeatherRow]) {
        println!("   (as of {})", Local::now().format("%H:%M"));
        for row in rows {
            if row.primary {
                println!("   {:<15} {}", format!("{}:", row.label), row.value);
            } else {
                println!("     {:<13} {}", format!("{}:", row.label), row.value);
            }
        }
    }

    fn set_error_message(&self, text: &str) {
        eprintln!("   ! {text}");
    }

    fn notify(&self, text: &str) {
        eprintln!("[!] {text}");
    }
}

#[derive(Debug, Default)]
pub struct TerminalSurface;

impl ViewSurface for TerminalSurface {
    fn set_nav_active(&self, _view: View, _active: bool) {}

    fn set_container_visible(&self, view: View, visible: bool) {
        if !visible {
            return;
        }
        let nav: Vec<String> = View::all()
            .iter()
            .map(|v| {
                if *v == view {
                    format!("[{v}]")
                } else {
                    v.to_string()
                }
            })
            .collect();
        println!("-- {} --", nav.join(" | "));
    }
}

/// Lets the prompt loop inject clicks the way a pointer would.
#[derive(Debug, Clone, Default)]
pub struct MapHandle {
    clicks: Arc<Mutex<Option<ClickSender>>>,
}

impl MapHandle {
    /// Returns `false` while no map exists to click on.
    pub fn click(&self, at: Coordinate) -> bool {
        match self.clicks.lock().as_ref() {
            Some(sender) => sender.send(at).is_ok(),
            None => false,
        }
    }
}

struct TerminalMap {
    handle: MapHandle,
    next_marker: u64,
    marker: Option<(MarkerId, Coordinate)>,
}

impl MapWidget for TerminalMap {
    fn add_tile_layer(&mut self, layer: TileLayer) {
        tracing::debug!(url = %layer.url_template, max_zoom = layer.max_zoom, "tile layer added");
        println!("   map data {}", layer.attribution);
    }

    fn on_click(&mut self, clicks: ClickSender) {
        *self.handle.clicks.lock() = Some(clicks);
    }

    fn add_marker(&mut self, at: Coordinate, _options: MarkerOptions) -> MarkerId {
        self.next_marker += 1;
        let id = MarkerId(self.next_marker);
        self.marker = Some((id, at));
        id
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        if self.marker.is_some_and(|(id, _)| id == marker) {
            self.marker = None;
        }
    }

    fn bind_popup(&mut self, marker: MarkerId, content: &str) {
        self.set_popup_content(marker, content);
    }

    fn open_popup(&mut self, _marker: MarkerId) {}

    fn set_popup_content(&mut self, marker: MarkerId, content: &str) {
        if let Some((_, at)) = self.marker.filter(|(id, _)| *id == marker) {
            println!("   @ {at}  {content}");
        }
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        println!("   map centered on {center} (zoom {zoom})");
    }

    fn invalidate_size(&mut self) {
        tracing::debug!("map re-measured");
    }
}

#[derive(Debug, Default)]
pub struct TerminalMapFactory {
    handle: MapHandle,
}

impl TerminalMapFactory {
    pub fn handle(&self) -> MapHandle {
        self.handle.clone()
    }
}

impl MapWidgetFactory for TerminalMapFactory {
    fn create(&self, options: &MapOptions) -> anyhow::Result<Box<dyn MapWidget>> {
        println!("   map centered on {} (zoom {})", options.center, options.zoom);
        Ok(Box::new(TerminalMap {
            handle: self.handle.clone(),
            next_marker: 0,
            marker: None,
        }))
    }
}
