use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;

use crate::{
    Coordinate,
    provider::{Forecast, WeatherSource, truncate_body},
};

const HOURLY_FIELDS: &str = "relativehumidity_2m,precipitation";

#[derive(Clone)]
pub struct OpenMeteoProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(api_key: Option<String>, base_url: &str, http: Client) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for OpenMeteoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenMeteoProvider")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoProvider {
    async fn forecast(&self, coordinate: Coordinate) -> Result<Forecast> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No API key configured for the weather service.\n\
                 Hint: run `weathermap configure` and enter your API key."
            )
        })?;

        let url = format!("{}/v1/forecast", self.base_url);
        let (lat, lon) = coordinate.query_pair();

        tracing::debug!(%coordinate, "requesting forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", lat.as_str()),
                ("longitude", lon.as_str()),
                ("current_weather", "true"),
                ("hourly", HOURLY_FIELDS),
                ("apikey", api_key),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).context("Failed to parse Open-Meteo JSON")
    }
}
