//! Run orchestration
//!
//! [`ScrapingManager`] owns one run: it walks regions in order, tiles each one
//! off the async runtime, runs a scheduler pass per keyword and records the
//! final [`RunState`]. The driver talks to it only through `start`, `stop`,
//! `stats` and `state`.

use super::control::RunControl;
use super::dedup::Deduplicator;
use super::enrichment::{EnrichmentPool, EnrichmentWorker};
use super::scheduler::AdaptiveSearchScheduler;
use crate::config::PipelineConfig;
use crate::crawler::{ContactCrawler, PageFetcher};
use crate::geo::{Cell, HexagonTiler, Region, SearchResolution};
use crate::output::{PipelineStats, ResultSink, StatsSnapshot};
use crate::places::{PlaceSearchProvider, RateLimiter};
use crate::state::RunState;
use crate::HiveError;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Orchestrates a scraping run; cheap to clone, clones share the same run
#[derive(Clone)]
pub struct ScrapingManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    config: Arc<PipelineConfig>,
    provider: Arc<dyn PlaceSearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<ResultSink>,
    stats: Arc<PipelineStats>,
    control: Arc<RunControl>,
    state: Mutex<RunState>,
}

impl ScrapingManager {
    /// Creates an idle manager; counters are the ones the sink updates
    pub fn new(
        config: PipelineConfig,
        provider: Arc<dyn PlaceSearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        sink: Arc<ResultSink>,
    ) -> Self {
        let stats = Arc::clone(sink.stats());
        let control = Arc::new(RunControl::new(config.target_results, Arc::clone(&stats)));

        Self {
            inner: Arc::new(ManagerInner {
                config: Arc::new(config),
                provider,
                fetcher,
                sink,
                stats,
                control,
                state: Mutex::new(RunState::Idle),
            }),
        }
    }

    /// Runs the pipeline on its own task
    pub fn start(&self) -> JoinHandle<Result<RunState, HiveError>> {
        let manager = self.clone();
        tokio::spawn(async move { manager.run().await })
    }

    /// Runs the pipeline to a terminal state
    ///
    /// Errors only if the manager was already started; failures during the
    /// run end in [`RunState::Failed`].
    pub async fn run(&self) -> Result<RunState, HiveError> {
        self.transition(RunState::Running)?;
        let config = &self.inner.config;
        tracing::info!(
            regions = config.regions.len(),
            keywords = config.keywords.len(),
            resolution = %config.resolution,
            target = config.target_results,
            "Starting scraping run"
        );

        let outcome = self.execute().await;

        let final_state = match outcome {
            Err(e) => {
                tracing::error!("Scraping run failed: {}", e);
                RunState::Failed(e.to_string())
            }
            Ok(()) if self.inner.control.stop_requested() => RunState::Stopped,
            Ok(()) => RunState::Completed,
        };
        self.transition(final_state.clone())?;

        tracing::info!(
            state = %final_state,
            stats = %self.stats(),
            "Scraping run finished"
        );
        Ok(final_state)
    }

    /// Asks every loop of the run to stop; in-flight enrichment still completes
    pub fn stop(&self) {
        tracing::info!("Stop requested");
        self.inner.control.stop();
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn state(&self) -> RunState {
        self.lock_state().clone()
    }

    pub fn sink(&self) -> &Arc<ResultSink> {
        &self.inner.sink
    }

    async fn execute(&self) -> Result<(), HiveError> {
        let inner = &self.inner;
        let config = Arc::clone(&inner.config);

        let rate_limiter = Arc::new(RateLimiter::new(config.max_calls_per_second));
        let crawler = ContactCrawler::new(Arc::clone(&inner.fetcher), config.fetch_timeout)
            .with_max_concurrent_fetches(config.max_concurrent_fetches);
        let worker = Arc::new(EnrichmentWorker::new(
            Arc::clone(&inner.provider),
            Arc::clone(&rate_limiter),
            crawler,
            config.max_links,
        ));
        let pool = EnrichmentPool::new(
            worker,
            Arc::clone(&inner.sink),
            config.max_concurrency,
            Arc::clone(&inner.control),
        );
        let scheduler = AdaptiveSearchScheduler::new(
            Arc::clone(&config),
            Arc::clone(&inner.provider),
            rate_limiter,
            Arc::new(Deduplicator::new()),
            Arc::clone(&inner.stats),
            pool,
            Arc::clone(&inner.control),
        );

        let walked = self.walk_regions(&config, &scheduler).await;
        let settled = scheduler.pool().settle().await;
        walked?;
        let late = settled?;
        if late > 0 {
            tracing::info!(records = late, "In-flight enrichment written after stop");
        }

        Ok(())
    }

    async fn walk_regions(
        &self,
        config: &PipelineConfig,
        scheduler: &AdaptiveSearchScheduler,
    ) -> Result<(), HiveError> {
        let inner = &self.inner;
        for region in &config.regions {
            if inner.control.should_stop() {
                break;
            }

            tracing::info!(region = %region.name, "Starting region");
            let cells = tile_region(region.clone(), config.resolution).await?;
            if cells.is_empty() {
                tracing::warn!(region = %region.name, "No cells generated, skipping region");
                continue;
            }
            tracing::info!(region = %region.name, cells = cells.len(), "Cells generated");

            for keyword in &config.keywords {
                if inner.control.should_stop() {
                    break;
                }

                tracing::info!(region = %region.name, keyword = %keyword, "Processing keyword");
                let report = scheduler.run_pass(region, &cells, keyword).await?;
                tracing::info!(
                    region = %region.name,
                    keyword = %keyword,
                    tasks = report.tasks_processed,
                    subdivisions = report.subdivisions,
                    places = report.places_dispatched,
                    remaining = report.tasks_remaining,
                    "Keyword pass finished"
                );
            }
        }

        Ok(())
    }

    fn transition(&self, next: RunState) -> Result<(), HiveError> {
        let mut state = self.lock_state();
        if !state.can_transition_to(&next) {
            return Err(HiveError::InvalidTransition {
                from: state.clone(),
                to: next,
            });
        }
        *state = next;
        Ok(())
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RunState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Tiles a region on the blocking pool; a panic there fails the run
async fn tile_region(region: Region, resolution: SearchResolution) -> Result<Vec<Cell>, HiveError> {
    tokio::task::spawn_blocking(move || HexagonTiler::new(resolution).tile(&region))
        .await
        .map_err(|e| HiveError::Task(format!("tiling task failed: {}", e)))
}
