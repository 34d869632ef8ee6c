//! Nominatim (OpenStreetMap) geocoding. Free, no API key, but requests must
//! carry an identifying User-Agent, which the shared client sets.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    Coordinate, PlaceInfo,
    provider::{Geocoder, truncate_body},
};

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn get_body(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Nominatim ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Nominatim {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Nominatim {} request failed with status {}: {}",
                endpoint,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Default, Deserialize)]
struct NmAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NmReverseResponse {
    #[serde(default)]
    address: Option<NmAddress>,
}

#[derive(Debug, Deserialize)]
struct NmSearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl From<NmAddress> for PlaceInfo {
    fn from(addr: NmAddress) -> Self {
        let city = [addr.city, addr.town, addr.village, addr.county]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| PlaceInfo::UNKNOWN_CITY.to_string());

        PlaceInfo {
            city,
            country: addr.country.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(&self, coordinate: Coordinate) -> Result<PlaceInfo> {
        let (lat, lon) = coordinate.query_pair();
        tracing::debug!(%coordinate, "reverse geocoding");

        let query = [
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("format", "json"),
        ];
        let body = self.get_body("reverse", &query).await?;

        let parsed: NmReverseResponse =
            serde_json::from_str(&body).context("Failed to parse Nominatim reverse JSON")?;

        let place = PlaceInfo::from(parsed.address.unwrap_or_default());
        tracing::info!(place = %place.label(), "reverse geocoded");
        Ok(place)
    }

    async fn search(&self, query: &str) -> Result<Option<Coordinate>> {
        tracing::debug!(query, "forward geocoding");

        let body = self
            .get_body("search", &[("q", query), ("format", "json"), ("limit", "1")])
            .await?;

        let hits: Vec<NmSearchHit> =
            serde_json::from_str(&body).context("Failed to parse Nominatim search JSON")?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let lat: f64 = hit
            .lat
            .trim()
            .parse()
            .with_context(|| format!("Invalid latitude in search result: {}", hit.lat))?;
        let lon: f64 = hit
            .lon
            .trim()
            .parse()
            .with_context(|| format!("Invalid longitude in search result: {}", hit.lon))?;

        tracing::info!(
            name = hit.display_name.as_deref().unwrap_or(query),
            lat,
            lon,
            "search matched"
        );
        Ok(Some(Coordinate::new(lat, lon)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(server: &MockServer) -> NominatimGeocoder {
        NominatimGeocoder::new(&server.uri(), Client::new())
    }

    fn address(fields: &[(&str, &str)]) -> NmAddress {
        let map: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).expect("address")
    }

    #[test]
    fn city_fallback_chain() {
        let place = PlaceInfo::from(address(&[("town", "Hallstatt"), ("county", "Gmunden")]));
        assert_eq!(place.city, "Hallstatt");

        let place = PlaceInfo::from(address(&[("village", "Giethoorn"), ("country", "NL")]));
        assert_eq!(place.label(), "Giethoorn, NL");

        let place = PlaceInfo::from(address(&[("county", "Inyo County")]));
        assert_eq!(place.city, "Inyo County");

        let place = PlaceInfo::from(address(&[("country", "Antarctica")]));
        assert_eq!(place.city, PlaceInfo::UNKNOWN_CITY);
        assert_eq!(place.country, "Antarctica");
    }

    #[tokio::test]
    async fn reverse_reads_address() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("lat", "48.8566"))
            .and(query_param("lon", "2.3522"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "display_name": "Paris, France",
                "address": {"city": "Paris", "country": "France"}
            })))
            .mount(&server)
            .await;

        let place = geocoder(&server)
            .reverse(Coordinate::new(48.8566, 2.3522))
            .await
            .expect("place");

        assert_eq!(
            place,
            PlaceInfo {
                city: "Paris".into(),
                country: "France".into(),
            }
        );
    }

    #[tokio::test]
    async fn reverse_over_ocean_is_unknown_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error": "Unable to geocode"})),
            )
            .mount(&server)
            .await;

        let place = geocoder(&server)
            .reverse(Coordinate::new(0.0, -30.0))
            .await
            .expect("place");

        assert_eq!(place.city, PlaceInfo::UNKNOWN_CITY);
        assert!(place.country.is_empty());
    }

    #[tokio::test]
    async fn search_takes_first_hit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "São Paulo"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "-23.5505199", "lon": "-46.6333094", "display_name": "São Paulo, Brasil"}
            ])))
            .mount(&server)
            .await;

        let geocoder = geocoder(&server);
        let found = geocoder.search("São Paulo").await.expect("search");
        assert_eq!(found, Some(Coordinate::new(-23.5505, -46.6333)));
    }

    #[tokio::test]
    async fn search_without_hits_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let geocoder = geocoder(&server);
        let found = geocoder.search("Nowhereville").await.expect("search");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn search_with_garbage_coordinates_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"lat": "north", "lon": "1"}])),
            )
            .mount(&server)
            .await;

        let err = geocoder(&server).search("x").await.unwrap_err();
        assert!(err.to_string().contains("Invalid latitude"));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = geocoder(&server).search("Oslo").await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
