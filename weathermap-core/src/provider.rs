use crate::{
    Config, Coordinate, PlaceInfo,
    provider::{nominatim::NominatimGeocoder, openmeteo::OpenMeteoProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

pub mod nominatim;
pub mod openmeteo;

/// Current conditions as reported by the weather service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub windspeed: f64,
    pub winddirection: f64,
    pub weathercode: i64,
}

/// Hourly series starting at local midnight. Elements may be null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub relativehumidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Forecast {
    pub current_weather: CurrentConditions,
    #[serde(default)]
    pub hourly: HourlySeries,
}

#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn forecast(&self, coordinate: Coordinate) -> anyhow::Result<Forecast>;
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Coordinate to place names.
    async fn reverse(&self, coordinate: Coordinate) -> anyhow::Result<PlaceInfo>;

    /// Free text to the best matching coordinate, if any.
    async fn search(&self, query: &str) -> anyhow::Result<Option<Coordinate>>;
}

/// HTTP client shared by both providers.
pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    let mut builder = Client::builder().user_agent(config.user_agent());
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Construct the weather source from config.
///
/// A missing API key is not an error here: the provider is still built and
/// every fetch it performs fails, so the session can report it per click.
pub fn weather_source_from_config(config: &Config, http: Client) -> Box<dyn WeatherSource> {
    Box::new(OpenMeteoProvider::new(
        config.weather_api_key().map(str::to_owned),
        config.weather_base_url(),
        http,
    ))
}

pub fn geocoder_from_config(config: &Config, http: Client) -> Box<dyn Geocoder> {
    Box::new(NominatimGeocoder::new(config.geocoding_base_url(), http))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
