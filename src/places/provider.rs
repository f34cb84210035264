//! Place-search provider interface
//!
//! The pipeline only talks to the provider through [`PlaceSearchProvider`], so
//! the Google client can be swapped for an in-memory stub in tests.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

/// Parameters of one nearby-search page request
#[derive(Debug, Clone, Copy)]
pub struct NearbyQuery<'a> {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: u32,
    /// Sent only when non-blank
    pub keyword: Option<&'a str>,
    /// Sent only when non-blank
    pub place_type: Option<&'a str>,
    pub page_token: Option<&'a str>,
}

/// Status reported by the provider for a search page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    /// Transport or decoding failure on our side
    RequestException,
    /// Any other provider status, kept verbatim
    Other(String),
}

impl SearchStatus {
    pub fn from_provider(status: &str) -> Self {
        match status {
            "OK" => Self::Ok,
            "ZERO_RESULTS" => Self::ZeroResults,
            "OVER_QUERY_LIMIT" => Self::OverQueryLimit,
            "REQUEST_EXCEPTION" => Self::RequestException,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "OK",
            Self::ZeroResults => "ZERO_RESULTS",
            Self::OverQueryLimit => "OVER_QUERY_LIMIT",
            Self::RequestException => "REQUEST_EXCEPTION",
            Self::Other(s) => s,
        }
    }

    /// True for statuses that are not worth a warning
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Ok | Self::ZeroResults)
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A business found by a search, not yet deduplicated or enriched
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCandidate {
    /// Provider place id; the run-wide deduplication key
    pub external_id: String,
    /// The search result as returned by the provider
    pub raw: Value,
}

impl PlaceCandidate {
    /// Builds a candidate from a raw search result, if it carries a place id
    pub fn from_search_result(raw: Value) -> Option<Self> {
        let external_id = raw.get("place_id")?.as_str()?.trim().to_string();
        if external_id.is_empty() {
            return None;
        }
        Some(Self { external_id, raw })
    }
}

/// One page of nearby-search results
#[derive(Debug, Clone)]
pub struct NearbyPage {
    pub results: Vec<PlaceCandidate>,
    /// Results the provider returned, including ones without a place id
    pub raw_count: usize,
    pub next_page_token: Option<String>,
    pub status: SearchStatus,
}

impl NearbyPage {
    /// An empty page carrying only a status
    pub fn empty(status: SearchStatus) -> Self {
        Self {
            results: Vec::new(),
            raw_count: 0,
            next_page_token: None,
            status,
        }
    }

    /// Builds a page from raw search results, keeping those with a place id
    pub fn from_raw(raw: Vec<Value>, next_page_token: Option<String>, status: SearchStatus) -> Self {
        let raw_count = raw.len();
        Self {
            results: raw
                .into_iter()
                .filter_map(PlaceCandidate::from_search_result)
                .collect(),
            raw_count,
            next_page_token,
            status,
        }
    }
}

/// Paginated nearby search and place details
#[async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    /// Fetches one page of places around a point; never fails, errors map to a status
    async fn nearby_search(&self, query: &NearbyQuery<'_>) -> NearbyPage;

    /// Fetches the detail record of a place, or `None` when unavailable
    async fn details(&self, place_id: &str, fields: &str) -> Option<Map<String, Value>>;
}
