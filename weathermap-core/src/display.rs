//! Results region rendering.

use crate::{Coordinate, LocationReport, SessionError, WeatherRow};

/// The results region and user notices, as provided by the UI layer.
pub trait DisplaySink: Send + Sync {
    fn set_location_label(&self, text: &str);
    fn set_coordinates_text(&self, text: &str);
    fn set_loading(&self);
    fn set_weather_rows(&self, rows: &[WeatherRow]);
    fn set_error_message(&self, text: &str);
    /// Modal-style notice, used for search outcomes.
    fn notify(&self, text: &str);
}

pub const LOADING_LABEL: &str = "Loading...";

pub fn render_loading(sink: &dyn DisplaySink, coordinate: Coordinate) {
    sink.set_location_label(LOADING_LABEL);
    sink.set_coordinates_text(&coordinate.display());
    sink.set_loading();
}

pub fn render_report(sink: &dyn DisplaySink, report: &LocationReport) {
    sink.set_location_label(&report.place.label());
    sink.set_coordinates_text(&format!("Coordinates: {}", report.coordinate.display()));
    sink.set_weather_rows(&weather_rows(report));
}

pub fn render_failure(sink: &dyn DisplaySink, err: &SessionError) {
    sink.set_error_message(err.user_message());
}

/// Text for the marker popup once the report is in.
pub fn popup_text(report: &LocationReport) -> String {
    format!("{}: see the weather card for details", report.place.city)
}

pub fn weather_rows(report: &LocationReport) -> Vec<WeatherRow> {
    let weather = &report.weather;

    let humidity = weather
        .humidity_percent
        .map(|h| format!("{h}%"))
        .unwrap_or_else(|| "N/A".to_string());

    let temperature = whole(weather.temperature_c);
    let wind_speed = whole(weather.wind_speed_kmh);

    vec![
        WeatherRow::primary("Temperature", format!("{temperature}°C")),
        WeatherRow::primary("Condition", report.condition.label()),
        WeatherRow::new("Wind Speed", format!("{wind_speed} km/h")),
        WeatherRow::new("Wind Direction", format!("{}°", weather.wind_direction_deg)),
        WeatherRow::new("Humidity", humidity),
        WeatherRow::new("Precipitation", format!("{} mm", weather.precipitation_mm)),
    ]
}

// Adding zero turns -0.0 into 0.0, so a reading of -0.3 prints as "0".
fn whole(value: f64) -> f64 {
    value.round() + 0.0
}
