//! Google Places web-service client
//!
//! Implements [`PlaceSearchProvider`] on top of the `nearbysearch` and
//! `details` JSON endpoints. All failures are folded into a status or `None`;
//! nothing here aborts a run.

use crate::places::{NearbyPage, NearbyQuery, PlaceSearchProvider, SearchStatus};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid JSON from {endpoint}: {source}")]
    Deserialize {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: Option<Map<String, Value>>,
}

/// Client for the Google Places web service
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    /// Builds a client against `base_url` (normally `https://maps.googleapis.com/maps/api/place`)
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}/json", self.base_url, endpoint);
        let body = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?
            .text()
            .await?;

        serde_json::from_str(&body).map_err(|source| ProviderError::Deserialize {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl PlaceSearchProvider for GooglePlacesClient {
    async fn nearby_search(&self, query: &NearbyQuery<'_>) -> NearbyPage {
        let mut params = vec![
            ("location", format!("{},{}", query.lat, query.lng)),
            ("radius", query.radius_m.to_string()),
        ];
        if let Some(keyword) = query.keyword.filter(|k| !k.trim().is_empty()) {
            params.push(("keyword", keyword.to_string()));
        }
        if let Some(place_type) = query.place_type.filter(|t| !t.trim().is_empty()) {
            params.push(("type", place_type.to_string()));
        }
        if let Some(token) = query.page_token {
            params.push(("pagetoken", token.to_string()));
        }

        let response: NearbyResponse = match self.get_json("nearbysearch", &params).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Nearby search request failed: {}", e);
                return NearbyPage::empty(SearchStatus::RequestException);
            }
        };

        let status =
            SearchStatus::from_provider(response.status.as_deref().unwrap_or("UNKNOWN_ERROR"));
        if status != SearchStatus::Ok {
            return NearbyPage::empty(status);
        }

        NearbyPage::from_raw(
            response.results,
            response.next_page_token.filter(|t| !t.is_empty()),
            status,
        )
    }

    async fn details(&self, place_id: &str, fields: &str) -> Option<Map<String, Value>> {
        let params = [
            ("place_id", place_id.to_string()),
            ("fields", fields.to_string()),
        ];

        match self.get_json::<DetailsResponse>("details", &params).await {
            Ok(response) if response.status.as_deref() == Some("OK") => response.result,
            Ok(response) => {
                tracing::debug!(
                    place_id,
                    status = response.status.as_deref().unwrap_or("UNKNOWN_ERROR"),
                    "Details lookup returned no record"
                );
                None
            }
            Err(e) => {
                tracing::debug!(place_id, "Details request failed: {}", e);
                None
            }
        }
    }
}
