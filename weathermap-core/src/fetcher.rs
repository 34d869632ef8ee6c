use chrono::{Local, Timelike};
use std::{fmt::Debug, sync::Arc};

use crate::{
    Coordinate, LocationReport, SessionError, WeatherSnapshot,
    catalog::WeatherCode,
    provider::{Forecast, Geocoder, WeatherSource},
};

/// Result of one click's fetch.
pub type FetchOutcome = Result<LocationReport, SessionError>;

/// Source of the viewer's local hour, used to index hourly series.
pub trait Clock: Send + Sync + Debug {
    fn local_hour(&self) -> usize;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_hour(&self) -> usize {
        Local::now().hour() as usize
    }
}

/// Fixed hour, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub usize);

impl Clock for FixedClock {
    fn local_hour(&self) -> usize {
        self.0
    }
}

/// Fans out the weather and place requests for a coordinate and joins them.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    weather: Arc<dyn WeatherSource>,
    geocoder: Arc<dyn Geocoder>,
    clock: Arc<dyn Clock>,
}

impl WeatherFetcher {
    pub fn new(
        weather: Arc<dyn WeatherSource>,
        geocoder: Arc<dyn Geocoder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            weather,
            geocoder,
            clock,
        }
    }

    pub async fn fetch(&self, coordinate: Coordinate) -> FetchOutcome {
        // Both requests run to completion before either result is inspected.
        let (forecast, place) = tokio::join!(
            self.weather.forecast(coordinate),
            self.geocoder.reverse(coordinate),
        );

        let forecast = forecast.map_err(|err| {
            tracing::warn!(%coordinate, error = %format!("{err:#}"), "weather request failed");
            SessionError::fetch(&err)
        })?;
        let place = place.map_err(|err| {
            tracing::warn!(%coordinate, error = %format!("{err:#}"), "place request failed");
            SessionError::fetch(&err)
        })?;

        let weather = snapshot(&forecast, self.clock.local_hour());
        let condition = WeatherCode::from_code(weather.weather_code);

        Ok(LocationReport {
            coordinate,
            weather,
            place,
            condition,
        })
    }
}

/// Pick the hourly samples at `hour`. Missing precipitation reads as 0;
/// missing humidity stays `None`.
pub fn snapshot(forecast: &Forecast, hour: usize) -> WeatherSnapshot {
    let current = &forecast.current_weather;
    let hourly = &forecast.hourly;

    WeatherSnapshot {
        temperature_c: current.temperature,
        wind_speed_kmh: current.windspeed,
        wind_direction_deg: current.winddirection,
        weather_code: current.weathercode,
        humidity_percent: hourly.relativehumidity_2m.get(hour).copied().flatten(),
        precipitation_mm: hourly
            .precipitation
            .get(hour)
            .copied()
            .flatten()
            .unwrap_or(0.0),
    }
}
