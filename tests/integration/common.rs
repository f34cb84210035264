//! Shared stubs and helpers for the integration tests

use async_trait::async_trait;
use hive_leads::config::PipelineConfig;
use hive_leads::crawler::{BrowserIdentity, FetchError, PageFetcher};
use hive_leads::geo::{Region, SearchResolution};
use hive_leads::output::{OutputPaths, PipelineStats, ResultSink};
use hive_leads::places::{NearbyPage, NearbyQuery, PlaceSearchProvider, SearchStatus};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory provider whose results depend only on the search point and page
///
/// The same point always yields the same place ids, whatever the keyword.
pub struct StubProvider {
    pub per_page: usize,
    /// Pages available per point; later pages are reached through tokens
    pub pages: usize,
    /// Queries with this search radius return `dense_count` results instead
    pub dense_radius: Option<u32>,
    pub dense_count: usize,
    /// Extra results per page that carry no place id
    pub anonymous: usize,
    pub status: SearchStatus,
    pub website: Option<String>,
    pub delay: Duration,
    /// Details for result `i` of a page take `(i + 1) * detail_step`
    pub detail_step: Duration,
    pub nearby_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page,
            pages: 1,
            dense_radius: None,
            dense_count: 60,
            anonymous: 0,
            status: SearchStatus::Ok,
            website: None,
            delay: Duration::ZERO,
            detail_step: Duration::ZERO,
            nearby_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PlaceSearchProvider for StubProvider {
    async fn nearby_search(&self, query: &NearbyQuery<'_>) -> NearbyPage {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.status != SearchStatus::Ok {
            return NearbyPage::empty(self.status.clone());
        }

        let page: usize = query
            .page_token
            .and_then(|token| token.strip_prefix("page-"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        let count = if self.dense_radius == Some(query.radius_m) {
            self.dense_count
        } else {
            self.per_page
        };

        let results = (0..count)
            .map(|i| {
                json!({
                    "place_id": format!("{:.6},{:.6}/{}/{}", query.lat, query.lng, page, i),
                    "name": format!("Business {}", i),
                })
            })
            .chain((0..self.anonymous).map(|i| json!({"name": format!("Unlisted {}", i)})))
            .collect();
        let next_page_token = (page + 1 < self.pages).then(|| format!("page-{}", page + 1));

        NearbyPage::from_raw(results, next_page_token, SearchStatus::Ok)
    }

    async fn details(&self, place_id: &str, _fields: &str) -> Option<Map<String, Value>> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if !self.detail_step.is_zero() {
            let index: u32 = place_id
                .rsplit('/')
                .next()
                .and_then(|i| i.parse().ok())
                .unwrap_or(0);
            tokio::time::sleep(self.detail_step * (index + 1)).await;
        }
        let mut details = Map::new();
        details.insert("place_id".to_string(), json!(place_id));
        details.insert("name".to_string(), json!(format!("Place {}", place_id)));
        if let Some(website) = &self.website {
            details.insert("website".to_string(), json!(website));
        }
        Some(details)
    }
}

/// Serves the same body for every URL
pub struct StaticFetcher {
    pub body: String,
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn get(
        &self,
        _url: &str,
        _identity: &BrowserIdentity,
        _timeout: Duration,
    ) -> Result<String, FetchError> {
        Ok(self.body.clone())
    }
}

pub fn static_fetcher(body: &str) -> Arc<StaticFetcher> {
    Arc::new(StaticFetcher {
        body: body.to_string(),
    })
}

/// Run parameters with no provider delays and a generous call budget
pub fn test_config(regions: Vec<Region>, keywords: &[&str], resolution: u8) -> PipelineConfig {
    PipelineConfig {
        api_key: "test-key".to_string(),
        regions,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        business_type: String::new(),
        resolution: SearchResolution::new(resolution).unwrap(),
        max_resolution: SearchResolution::finest(),
        target_results: 1_000_000,
        max_concurrency: 4,
        max_links: 5,
        max_concurrent_fetches: 4,
        density_threshold: 58,
        max_pages: 3,
        max_calls_per_second: 1000,
        page_token_delay: Duration::ZERO,
        over_query_limit_backoff: Duration::ZERO,
        fetch_timeout: Duration::from_secs(1),
    }
}

pub fn create_sink(dir: &Path) -> Arc<ResultSink> {
    let paths = OutputPaths::for_session(dir, "leads", "test0001");
    Arc::new(ResultSink::create(paths, Arc::new(PipelineStats::new())).unwrap())
}

/// Data rows of a CSV output file (header excluded)
pub fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.records().map(|r| r.unwrap()).collect()
}
