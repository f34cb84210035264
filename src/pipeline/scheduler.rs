//! Adaptive search over hexagonal cells
//!
//! This module handles:
//! - The FIFO queue of (cell, keyword) search tasks for one region pass
//! - Paginated nearby searches through the shared rate limiter
//! - Subdividing cells whose result count hits the density threshold
//! - Claiming new place ids and handing them to the enrichment pool

use super::control::RunControl;
use super::dedup::Deduplicator;
use super::enrichment::{EnrichmentPool, SearchOrigin};
use crate::config::PipelineConfig;
use crate::geo::{Cell, Region};
use crate::output::PipelineStats;
use crate::places::{
    NearbyQuery, PlaceCandidate, PlaceSearchProvider, RateLimiter, SearchStatus,
};
use crate::HiveError;
use std::collections::VecDeque;
use std::sync::Arc;

/// One cell to search for one keyword
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTask {
    pub cell: Cell,
    pub keyword: String,
}

/// What happened to a processed task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Too dense; this many child tasks were queued instead
    Subdivided(usize),
    /// Results were final; `unique` of `found` places were new
    Finalized { found: usize, unique: usize },
    /// Nothing new was found
    Empty,
}

/// Totals for one (region, keyword) pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub tasks_processed: usize,
    pub subdivisions: usize,
    pub places_dispatched: usize,
    /// Tasks still queued when the pass stopped early
    pub tasks_remaining: usize,
}

/// Drives the search queue for one region and keyword at a time
pub struct AdaptiveSearchScheduler {
    config: Arc<PipelineConfig>,
    provider: Arc<dyn PlaceSearchProvider>,
    rate_limiter: Arc<RateLimiter>,
    dedup: Arc<Deduplicator>,
    stats: Arc<PipelineStats>,
    pool: EnrichmentPool,
    control: Arc<RunControl>,
}

impl AdaptiveSearchScheduler {
    pub fn new(
        config: Arc<PipelineConfig>,
        provider: Arc<dyn PlaceSearchProvider>,
        rate_limiter: Arc<RateLimiter>,
        dedup: Arc<Deduplicator>,
        stats: Arc<PipelineStats>,
        pool: EnrichmentPool,
        control: Arc<RunControl>,
    ) -> Self {
        Self {
            config,
            provider,
            rate_limiter,
            dedup,
            stats,
            pool,
            control,
        }
    }

    pub fn pool(&self) -> &EnrichmentPool {
        &self.pool
    }

    /// Searches every cell for `keyword`, subdividing dense cells as it goes
    ///
    /// The stop condition is checked before each dequeue; tasks left in the
    /// queue when it trips are dropped unprocessed.
    pub async fn run_pass(
        &self,
        region: &Region,
        cells: &[Cell],
        keyword: &str,
    ) -> Result<PassReport, HiveError> {
        let mut queue: VecDeque<SearchTask> = cells
            .iter()
            .map(|cell| SearchTask {
                cell: *cell,
                keyword: keyword.to_string(),
            })
            .collect();
        let mut report = PassReport::default();

        while let Some(task) = self.next_task(&mut queue) {
            report.tasks_processed += 1;
            tracing::debug!(
                region = %region.name,
                keyword,
                cell = %task.cell,
                resolution = task.cell.resolution().level(),
                queue_len = queue.len(),
                "Searching cell"
            );

            match self.process_task(&task, &region.name, &mut queue).await? {
                TaskOutcome::Subdivided(_) => report.subdivisions += 1,
                TaskOutcome::Finalized { unique, .. } => report.places_dispatched += unique,
                TaskOutcome::Empty => {}
            }
        }

        report.tasks_remaining = queue.len();
        Ok(report)
    }

    fn next_task(&self, queue: &mut VecDeque<SearchTask>) -> Option<SearchTask> {
        if self.control.should_stop() {
            return None;
        }
        queue.pop_front()
    }

    /// Searches one cell and either subdivides it or dispatches its new places
    pub async fn process_task(
        &self,
        task: &SearchTask,
        region_name: &str,
        queue: &mut VecDeque<SearchTask>,
    ) -> Result<TaskOutcome, HiveError> {
        let (lat, lng) = task.cell.centroid();
        let (results, raw_count) = self.search_cell(task, lat, lng).await;

        let resolution = task.cell.resolution();
        if raw_count >= self.config.density_threshold && resolution < self.config.max_resolution {
            if let Some(children) = task.cell.children() {
                tracing::info!(
                    cell = %task.cell,
                    resolution = resolution.level(),
                    results = raw_count,
                    children = children.len(),
                    "Dense cell, subdividing"
                );
                let count = children.len();
                queue.extend(children.into_iter().map(|cell| SearchTask {
                    cell,
                    keyword: task.keyword.clone(),
                }));
                return Ok(TaskOutcome::Subdivided(count));
            }
        }

        let found = results.len();
        let unique: Vec<PlaceCandidate> = results
            .into_iter()
            .filter(|candidate| self.dedup.try_claim(&candidate.external_id))
            .collect();
        if unique.is_empty() {
            return Ok(TaskOutcome::Empty);
        }

        let count = unique.len();
        tracing::info!(
            cell = %task.cell,
            found,
            new = count,
            "New places to enrich"
        );

        let origin = SearchOrigin {
            cell_id: task.cell.id(),
            lat,
            lng,
            region_name: region_name.to_string(),
        };
        self.pool.process(unique, origin).await?;

        Ok(TaskOutcome::Finalized {
            found,
            unique: count,
        })
    }

    /// Collects up to `max_pages` pages of results around the cell centre
    ///
    /// Also returns how many raw results the pages held, id or not.
    async fn search_cell(
        &self,
        task: &SearchTask,
        lat: f64,
        lng: f64,
    ) -> (Vec<PlaceCandidate>, usize) {
        let keyword = Some(task.keyword.as_str()).filter(|k| !k.trim().is_empty());
        let place_type =
            Some(self.config.business_type.as_str()).filter(|t| !t.trim().is_empty());
        let radius_m = task.cell.resolution().search_radius_m();

        let mut results = Vec::new();
        let mut raw_count = 0;
        let mut page_token: Option<String> = None;

        for _ in 0..self.config.max_pages {
            if page_token.is_some() {
                tokio::time::sleep(self.config.page_token_delay).await;
            }
            self.rate_limiter.acquire().await;

            let query = NearbyQuery {
                lat,
                lng,
                radius_m,
                keyword,
                place_type,
                page_token: page_token.as_deref(),
            };
            let page = self.provider.nearby_search(&query).await;
            self.stats.record_api_call();

            if !page.status.is_expected() {
                tracing::warn!(
                    cell = %task.cell,
                    status = %page.status,
                    "API warning for cell at ({:.4}, {:.4})",
                    lat,
                    lng
                );
            }
            if page.status == SearchStatus::OverQueryLimit {
                tokio::time::sleep(self.config.over_query_limit_backoff).await;
            }

            raw_count += page.raw_count;
            results.extend(page.results);
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        (results, raw_count)
    }
}
