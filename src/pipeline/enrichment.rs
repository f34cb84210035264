//! Enrichment of unique place candidates
//!
//! Every candidate that survives deduplication gets its detail record from the
//! provider and, when it lists a website, a contact crawl. Finished records are
//! written by the task that produced them. Batches cut short by a stop are
//! parked on the pool and awaited by [`EnrichmentPool::settle`] before the run
//! reaches a terminal state.

use super::control::RunControl;
use crate::crawler::{ContactCrawler, ContactInfo};
use crate::output::{PlaceRecord, ResultSink};
use crate::places::{detail_fields_param, PlaceCandidate, PlaceSearchProvider, RateLimiter};
use crate::HiveError;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Where a batch of candidates was found
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOrigin {
    pub cell_id: String,
    pub lat: f64,
    pub lng: f64,
    pub region_name: String,
}

/// Turns one candidate into a finished [`PlaceRecord`]
pub struct EnrichmentWorker {
    provider: Arc<dyn PlaceSearchProvider>,
    rate_limiter: Arc<RateLimiter>,
    crawler: ContactCrawler,
    max_links: usize,
    detail_fields: String,
}

impl EnrichmentWorker {
    pub fn new(
        provider: Arc<dyn PlaceSearchProvider>,
        rate_limiter: Arc<RateLimiter>,
        crawler: ContactCrawler,
        max_links: usize,
    ) -> Self {
        Self {
            provider,
            rate_limiter,
            crawler,
            max_links,
            detail_fields: detail_fields_param(),
        }
    }

    /// Returns `None` when the provider has no detail record for the place
    pub async fn enrich(
        &self,
        candidate: &PlaceCandidate,
        origin: &SearchOrigin,
    ) -> Option<PlaceRecord> {
        self.rate_limiter.acquire().await;
        let details = match self
            .provider
            .details(&candidate.external_id, &self.detail_fields)
            .await
        {
            Some(details) => details,
            None => {
                tracing::debug!(place_id = %candidate.external_id, "No details, skipping place");
                return None;
            }
        };

        let website = details
            .get("website")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let contacts = match website {
            Some(website) => self.crawler.discover(&website, self.max_links).await,
            None => ContactInfo::default(),
        };

        Some(PlaceRecord::new(
            details,
            contacts,
            origin.cell_id.clone(),
            (origin.lat, origin.lng),
            origin.region_name.clone(),
        ))
    }
}

/// Bounded pool running [`EnrichmentWorker`]s for the whole run
///
/// A single semaphore caps concurrent enrichments across every batch.
pub struct EnrichmentPool {
    worker: Arc<EnrichmentWorker>,
    sink: Arc<ResultSink>,
    permits: Arc<Semaphore>,
    control: Arc<RunControl>,
    detached: Mutex<Vec<JoinSet<bool>>>,
}

impl EnrichmentPool {
    pub fn new(
        worker: Arc<EnrichmentWorker>,
        sink: Arc<ResultSink>,
        max_concurrency: usize,
        control: Arc<RunControl>,
    ) -> Self {
        Self {
            worker,
            sink,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            control,
            detached: Mutex::new(Vec::new()),
        }
    }

    /// Enriches and writes a batch of already-claimed candidates
    ///
    /// Waits for the batch unless the run is told to stop, in which case the
    /// remaining tasks keep running and are parked until [`Self::settle`].
    pub async fn process(
        &self,
        candidates: Vec<PlaceCandidate>,
        origin: SearchOrigin,
    ) -> Result<usize, HiveError> {
        let origin = Arc::new(origin);
        let mut tasks = JoinSet::new();

        for candidate in candidates {
            let worker = Arc::clone(&self.worker);
            let sink = Arc::clone(&self.sink);
            let permits = Arc::clone(&self.permits);
            let origin = Arc::clone(&origin);

            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return false;
                };
                let Some(record) = worker.enrich(&candidate, &origin).await else {
                    return false;
                };
                match sink.write(&record) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!(place_id = %candidate.external_id, "Failed to write record: {}", e);
                        false
                    }
                }
            });
        }

        let mut written = 0;
        loop {
            if self.control.should_stop() {
                tracing::debug!(pending = tasks.len(), "Stop observed, parking enrichment tasks");
                self.park(tasks);
                break;
            }

            match tasks.join_next().await {
                Some(Ok(true)) => written += 1,
                Some(Ok(false)) => {}
                Some(Err(e)) if e.is_panic() => {
                    self.park(tasks);
                    return Err(HiveError::Task(format!("enrichment task panicked: {}", e)));
                }
                Some(Err(_)) => {}
                None => break,
            }
        }

        Ok(written)
    }

    /// Waits for every parked task and returns how many records they wrote
    pub async fn settle(&self) -> Result<usize, HiveError> {
        let batches = std::mem::take(&mut *self.lock_detached());
        let pending: usize = batches.iter().map(JoinSet::len).sum();
        if pending > 0 {
            tracing::info!(pending, "Waiting for in-flight enrichment");
        }

        let mut written = 0;
        let mut failure = None;
        for mut tasks in batches {
            while let Some(result) = tasks.join_next().await {
                match result {
                    Ok(true) => written += 1,
                    Ok(false) => {}
                    Err(e) if e.is_panic() => {
                        failure = Some(HiveError::Task(format!("enrichment task panicked: {}", e)));
                    }
                    Err(_) => {}
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }

    fn park(&self, tasks: JoinSet<bool>) {
        if !tasks.is_empty() {
            self.lock_detached().push(tasks);
        }
    }

    fn lock_detached(&self) -> MutexGuard<'_, Vec<JoinSet<bool>>> {
        self.detached.lock().unwrap_or_else(|e| e.into_inner())
    }
}
