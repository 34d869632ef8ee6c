use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{catalog::WeatherCode, coord::Coordinate};

/// Top-level screens. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Home,
    Map,
}

impl View {
    /// Tag carried by navigation controls.
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Map => "map",
        }
    }

    pub const fn all() -> &'static [View] {
        &[View::Home, View::Map]
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for View {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "home" => Ok(View::Home),
            "map" => Ok(View::Map),
            _ => Err(anyhow::anyhow!(
                "Unknown view '{value}'. Supported views: home, map."
            )),
        }
    }
}

/// Current conditions plus the hourly samples picked for the viewer's hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: f64,
    pub weather_code: i64,
    pub humidity_percent: Option<f64>,
    pub precipitation_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceInfo {
    pub city: String,
    /// Empty when the geocoder did not report a country.
    pub country: String,
}

impl PlaceInfo {
    pub const UNKNOWN_CITY: &'static str = "Unknown Location";

    /// `City` or `City, Country`.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.city.clone()
        } else {
            format!("{}, {}", self.city, self.country)
        }
    }
}

/// Render-ready result of one successful weather + place fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    pub coordinate: Coordinate,
    pub weather: WeatherSnapshot,
    pub place: PlaceInfo,
    pub condition: WeatherCode,
}

/// One line of the weather readout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRow {
    pub label: &'static str,
    pub value: String,
    /// Headline rows (temperature, condition) are emphasized by the UI.
    pub primary: bool,
}

impl WeatherRow {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            primary: false,
        }
    }

    pub fn primary(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            primary: true,
        }
    }
}
