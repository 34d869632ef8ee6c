use std::sync::Arc;

use crate::{Coordinate, SessionError, provider::Geocoder};

/// Turns free text into a coordinate via forward geocoding.
#[derive(Debug, Clone)]
pub struct SearchController {
    geocoder: Arc<dyn Geocoder>,
}

impl SearchController {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Best match for `query`, which the caller has already trimmed.
    pub async fn resolve(&self, query: &str) -> Result<Coordinate, SessionError> {
        tracing::debug!(query, "searching");

        match self.geocoder.search(query).await {
            Ok(Some(found)) => Ok(found),
            Ok(None) => {
                tracing::info!(query, "no search results");
                Err(SessionError::SearchNotFound(query.to_string()))
            }
            Err(err) => {
                tracing::warn!(query, error = %format!("{err:#}"), "search failed");
                Err(SessionError::search(&err))
            }
        }
    }
}
