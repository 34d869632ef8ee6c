use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fractional digits kept on every coordinate component.
pub const PRECISION: i32 = 4;

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A latitude/longitude pair rounded to [`PRECISION`] fractional digits.
///
/// Rounding happens once, at construction, so every request and every
/// display string built from a `Coordinate` sees the same values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl From<RawCoordinate> for Coordinate {
    fn from(raw: RawCoordinate) -> Self {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: round_component(latitude),
            longitude: round_component(longitude),
        }
    }

    /// Like [`Coordinate::new`], but rejects points that are not on the globe.
    pub fn checked(latitude: f64, longitude: f64) -> anyhow::Result<Self> {
        let latitude = check_latitude(latitude)?;
        let longitude = check_longitude(longitude)?;
        Ok(Self::new(latitude, longitude))
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Display form used by the results region, e.g. `40.7128°, -74.0060°`.
    pub fn display(&self) -> String {
        format_coordinates(self.latitude, self.longitude)
    }

    /// Component strings as sent in query parameters.
    pub fn query_pair(&self) -> (String, String) {
        (
            format!("{:.4}", self.latitude),
            format!("{:.4}", self.longitude),
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Round both components and format them as `lat°, lon°`.
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!(
        "{:.4}°, {:.4}°",
        round_component(latitude),
        round_component(longitude)
    )
}

pub fn check_latitude(value: f64) -> anyhow::Result<f64> {
    check_component("latitude", value, MAX_LATITUDE)
}

pub fn check_longitude(value: f64) -> anyhow::Result<f64> {
    check_component("longitude", value, MAX_LONGITUDE)
}

fn check_component(name: &str, value: f64, limit: f64) -> anyhow::Result<f64> {
    if !value.is_finite() || value.abs() > limit {
        bail!("{name} {value} is out of range (expected -{limit} to {limit})");
    }
    Ok(value)
}

// Half away from zero, which is what `f64::round` does.
fn round_component(value: f64) -> f64 {
    let scale = 10f64.powi(PRECISION);
    (value * scale).round() / scale
}
