//! Integration tests for the search pipeline
//!
//! These tests drive the scheduler and the manager against in-memory
//! providers and fetchers and check what lands in the output files.

use crate::common::{create_sink, read_rows, static_fetcher, test_config, StubProvider};
use geo::{LineString, Polygon};
use hive_leads::geo::{Cell, HexagonTiler, Region, RegionGeometry, SearchResolution};
use hive_leads::output::ResultSink;
use hive_leads::pipeline::{
    AdaptiveSearchScheduler, Deduplicator, EnrichmentPool, EnrichmentWorker, RunControl,
    TaskOutcome, SearchTask,
};
use hive_leads::crawler::{ContactCrawler, PageFetcher};
use hive_leads::places::{PlaceSearchProvider, RateLimiter, SearchStatus};
use hive_leads::{HiveError, PipelineConfig, RunState, ScrapingManager};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Builds a scheduler wired to `sink`, the way the manager does
fn build_scheduler(
    config: PipelineConfig,
    provider: Arc<dyn PlaceSearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<ResultSink>,
) -> AdaptiveSearchScheduler {
    let config = Arc::new(config);
    let stats = Arc::clone(sink.stats());
    let control = Arc::new(RunControl::new(config.target_results, Arc::clone(&stats)));
    let rate_limiter = Arc::new(RateLimiter::new(config.max_calls_per_second));
    let worker = Arc::new(EnrichmentWorker::new(
        Arc::clone(&provider),
        Arc::clone(&rate_limiter),
        ContactCrawler::new(fetcher, config.fetch_timeout),
        config.max_links,
    ));
    let pool = EnrichmentPool::new(worker, sink, config.max_concurrency, Arc::clone(&control));

    AdaptiveSearchScheduler::new(
        config,
        provider,
        rate_limiter,
        Arc::new(Deduplicator::new()),
        stats,
        pool,
        control,
    )
}

/// Four well-separated cells at resolution 7
fn four_cells() -> Vec<Cell> {
    let resolution = SearchResolution::new(7).unwrap();
    [(40.0, -74.0), (40.1, -74.0), (40.0, -74.1), (40.1, -74.1)]
        .iter()
        .map(|(lat, lng)| Cell::containing(*lat, *lng, resolution).unwrap())
        .collect()
}

fn rectangle(name: &str, min_lng: f64, min_lat: f64, size: f64) -> Region {
    let ring = LineString::from(vec![
        (min_lng, min_lat),
        (min_lng + size, min_lat),
        (min_lng + size, min_lat + size),
        (min_lng, min_lat + size),
        (min_lng, min_lat),
    ]);
    Region::new(name, RegionGeometry::Polygon(Polygon::new(ring, vec![])))
}

fn label_only_region() -> Region {
    Region::new("Test Region", RegionGeometry::Unsupported)
}

#[tokio::test]
async fn test_four_cells_two_results_each() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());
    let scheduler = build_scheduler(
        test_config(vec![], &["plumber"], 7),
        Arc::new(StubProvider::new(2)),
        static_fetcher(""),
        Arc::clone(&sink),
    );

    let report = scheduler
        .run_pass(&label_only_region(), &four_cells(), "plumber")
        .await
        .unwrap();
    assert_eq!(report.tasks_processed, 4);
    assert_eq!(report.places_dispatched, 8);

    let stats = sink.stats().snapshot();
    assert_eq!(stats.api_calls, 4);
    assert_eq!(stats.places_processed, 8);
    assert_eq!(stats.with_email, 0);
    assert_eq!(stats.without_email, 8);

    assert_eq!(read_rows(&sink.paths().without_emails).len(), 8);
    assert!(read_rows(&sink.paths().with_emails).is_empty());
}

#[tokio::test]
async fn test_results_without_place_id_count_toward_density() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());
    let cell = four_cells()[0];

    let mut provider = StubProvider::new(50);
    provider.anonymous = 10;
    let scheduler = build_scheduler(
        test_config(vec![], &["cafe"], 7),
        Arc::new(provider),
        static_fetcher(""),
        Arc::clone(&sink),
    );

    let task = SearchTask {
        cell,
        keyword: "cafe".to_string(),
    };
    let mut queue = VecDeque::new();
    let outcome = scheduler
        .process_task(&task, "Test Region", &mut queue)
        .await
        .unwrap();

    assert_eq!(outcome, TaskOutcome::Subdivided(7));
    assert_eq!(sink.stats().snapshot().places_processed, 0);
}

#[tokio::test]
async fn test_dense_cell_subdivides() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());
    let cell = four_cells()[0];

    let mut provider = StubProvider::new(2);
    provider.dense_radius = Some(cell.resolution().search_radius_m());
    let scheduler = build_scheduler(
        test_config(vec![], &["cafe"], 7),
        Arc::new(provider),
        static_fetcher(""),
        Arc::clone(&sink),
    );

    let task = SearchTask {
        cell,
        keyword: "cafe".to_string(),
    };
    let mut queue = VecDeque::new();
    let outcome = scheduler
        .process_task(&task, "Test Region", &mut queue)
        .await
        .unwrap();

    assert_eq!(outcome, TaskOutcome::Subdivided(7));
    assert_eq!(queue.len(), 7);
    assert!(queue
        .iter()
        .all(|child| child.cell.resolution().level() == 8 && child.keyword == "cafe"));

    let stats = sink.stats().snapshot();
    assert_eq!(stats.api_calls, 1);
    assert_eq!(stats.places_processed, 0);
}

#[tokio::test]
async fn test_dense_cell_at_max_resolution_is_final() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());
    let cell = Cell::containing(40.0, -74.0, SearchResolution::new(9).unwrap()).unwrap();

    let mut provider = StubProvider::new(2);
    provider.dense_radius = Some(cell.resolution().search_radius_m());
    let mut config = test_config(vec![], &["cafe"], 9);
    config.max_resolution = SearchResolution::new(9).unwrap();
    let scheduler = build_scheduler(
        config,
        Arc::new(provider),
        static_fetcher(""),
        Arc::clone(&sink),
    );

    let task = SearchTask {
        cell,
        keyword: "cafe".to_string(),
    };
    let mut queue = VecDeque::new();
    let outcome = scheduler
        .process_task(&task, "Test Region", &mut queue)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TaskOutcome::Finalized {
            found: 60,
            unique: 60
        }
    );
    assert!(queue.is_empty());
    assert_eq!(sink.stats().snapshot().places_processed, 60);
}

#[tokio::test]
async fn test_subdivided_pass_searches_children() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());
    let cell = four_cells()[0];

    let mut provider = StubProvider::new(2);
    provider.dense_radius = Some(cell.resolution().search_radius_m());
    let scheduler = build_scheduler(
        test_config(vec![], &["cafe"], 7),
        Arc::new(provider),
        static_fetcher(""),
        Arc::clone(&sink),
    );

    let report = scheduler
        .run_pass(&label_only_region(), &[cell], "cafe")
        .await
        .unwrap();
    assert_eq!(report.subdivisions, 1);
    assert_eq!(report.tasks_processed, 8);

    // One coarse query, then seven child queries with two results each
    let stats = sink.stats().snapshot();
    assert_eq!(stats.api_calls, 8);
    assert_eq!(stats.places_processed, 14);
}

#[tokio::test]
async fn test_pagination_capped_at_max_pages() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());

    let mut provider = StubProvider::new(2);
    provider.pages = 5;
    let scheduler = build_scheduler(
        test_config(vec![], &["dentist"], 7),
        Arc::new(provider),
        static_fetcher(""),
        Arc::clone(&sink),
    );

    scheduler
        .run_pass(&label_only_region(), &four_cells()[..1], "dentist")
        .await
        .unwrap();

    let stats = sink.stats().snapshot();
    assert_eq!(stats.api_calls, 3);
    assert_eq!(stats.places_processed, 6);
}

#[tokio::test]
async fn test_over_query_limit_counts_call_and_yields_nothing() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());

    let mut provider = StubProvider::new(2);
    provider.status = SearchStatus::OverQueryLimit;
    let scheduler = build_scheduler(
        test_config(vec![], &["florist"], 7),
        Arc::new(provider),
        static_fetcher(""),
        Arc::clone(&sink),
    );

    let report = scheduler
        .run_pass(&label_only_region(), &four_cells(), "florist")
        .await
        .unwrap();
    assert_eq!(report.places_dispatched, 0);

    let stats = sink.stats().snapshot();
    assert_eq!(stats.api_calls, 4);
    assert_eq!(stats.places_processed, 0);
}

#[tokio::test]
async fn test_rediscovered_places_written_once() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());
    let provider = Arc::new(StubProvider::new(2));
    let scheduler = build_scheduler(
        test_config(vec![], &["plumber", "electrician"], 7),
        provider.clone(),
        static_fetcher(""),
        Arc::clone(&sink),
    );

    let region = label_only_region();
    let cells = four_cells();
    scheduler.run_pass(&region, &cells, "plumber").await.unwrap();
    let second = scheduler
        .run_pass(&region, &cells, "electrician")
        .await
        .unwrap();
    assert_eq!(second.places_dispatched, 0);

    let stats = sink.stats().snapshot();
    assert_eq!(stats.api_calls, 8);
    assert_eq!(stats.places_processed, 8);
    assert_eq!(
        provider
            .detail_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        8
    );
    assert_eq!(read_rows(&sink.paths().without_emails).len(), 8);
}

#[tokio::test]
async fn test_websites_with_emails_go_to_email_partition() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());

    let mut provider = StubProvider::new(2);
    provider.website = Some("http://www.joes-plumbing.test".to_string());
    let scheduler = build_scheduler(
        test_config(vec![], &["plumber"], 7),
        Arc::new(provider),
        static_fetcher(
            r#"<a href="mailto:office@joes-plumbing.test">Mail</a> https://www.facebook.com/joesplumbing"#,
        ),
        Arc::clone(&sink),
    );

    scheduler
        .run_pass(&label_only_region(), &four_cells()[..2], "plumber")
        .await
        .unwrap();

    let stats = sink.stats().snapshot();
    assert_eq!(stats.with_email, 4);
    assert_eq!(stats.without_email, 0);

    let rows = read_rows(&sink.paths().with_emails);
    assert_eq!(rows.len(), 4);
    let columns = hive_leads::output::columns();
    let emails_col = columns.iter().position(|c| *c == "emails").unwrap();
    let facebook_col = columns.iter().position(|c| *c == "facebook").unwrap();
    for row in &rows {
        let emails = hive_leads::output::decode_list_cell(&row[emails_col]).unwrap();
        assert_eq!(emails, vec!["office@joes-plumbing.test"]);
        let facebook = hive_leads::output::decode_list_cell(&row[facebook_col]).unwrap();
        assert_eq!(facebook, vec!["https://www.facebook.com/joesplumbing"]);
    }
}

#[tokio::test]
async fn test_manager_runs_region_to_completion() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());
    let region = rectangle("Grid Town", -74.05, 40.0, 0.05);
    let expected_cells = HexagonTiler::new(SearchResolution::new(7).unwrap()).tile(&region);
    assert!(!expected_cells.is_empty());

    let manager = ScrapingManager::new(
        test_config(vec![region], &["plumber"], 7),
        Arc::new(StubProvider::new(2)),
        static_fetcher(""),
        Arc::clone(&sink),
    );
    assert_eq!(manager.state(), RunState::Idle);

    let state = manager.run().await.unwrap();
    assert_eq!(state, RunState::Completed);
    assert_eq!(manager.state(), RunState::Completed);

    let stats = manager.stats();
    assert_eq!(stats.api_calls, expected_cells.len() as u64);
    assert_eq!(stats.places_processed, 2 * expected_cells.len() as u64);
    assert_eq!(
        read_rows(&sink.paths().without_emails).len() as u64,
        stats.places_processed
    );
}

#[tokio::test]
async fn test_manager_cannot_run_twice() {
    let dir = TempDir::new().unwrap();
    let manager = ScrapingManager::new(
        test_config(vec![label_only_region()], &["plumber"], 7),
        Arc::new(StubProvider::new(2)),
        static_fetcher(""),
        create_sink(dir.path()),
    );

    assert_eq!(manager.run().await.unwrap(), RunState::Completed);
    let err = manager.run().await.unwrap_err();
    assert!(matches!(err, HiveError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_manager_skips_untileable_region() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(StubProvider::new(2));
    let manager = ScrapingManager::new(
        test_config(vec![label_only_region()], &["plumber"], 7),
        provider.clone(),
        static_fetcher(""),
        create_sink(dir.path()),
    );

    assert_eq!(manager.run().await.unwrap(), RunState::Completed);
    assert_eq!(manager.stats().api_calls, 0);
    assert_eq!(
        provider
            .nearby_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_manager_completes_when_target_reached() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());
    let region = rectangle("Big Town", -74.1, 40.0, 0.1);
    let cell_count = HexagonTiler::new(SearchResolution::new(7).unwrap())
        .tile(&region)
        .len();
    assert!(cell_count > 4);

    let mut provider = StubProvider::new(2);
    provider.website = Some("http://www.shop.test".to_string());
    let mut config = test_config(vec![region], &["plumber", "roofer"], 7);
    config.target_results = 3;

    let manager = ScrapingManager::new(
        config,
        Arc::new(provider),
        static_fetcher("contact: hello@shop.test"),
        Arc::clone(&sink),
    );

    let state = manager.start().await.unwrap().unwrap();
    assert_eq!(state, RunState::Completed);

    let stats = manager.stats();
    assert!(stats.with_email >= 3);
    assert_eq!(stats.without_email, 0);
    assert!(stats.api_calls < cell_count as u64);
}

#[tokio::test]
async fn test_stop_mid_run_freezes_stats() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());
    let region = rectangle("Slow Town", -74.1, 40.0, 0.1);
    let cell_count = HexagonTiler::new(SearchResolution::new(7).unwrap())
        .tile(&region)
        .len();

    let mut provider = StubProvider::new(2);
    provider.delay = Duration::from_millis(25);
    let manager = ScrapingManager::new(
        test_config(vec![region], &["plumber"], 7),
        Arc::new(provider),
        static_fetcher(""),
        Arc::clone(&sink),
    );

    let handle = manager.start();
    tokio::time::sleep(Duration::from_millis(120)).await;
    manager.stop();

    let state = handle.await.unwrap().unwrap();
    assert_eq!(state, RunState::Stopped);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let first = manager.stats();
    tokio::time::sleep(Duration::from_millis(200)).await;
    let second = manager.stats();

    assert_eq!(first, second);
    assert!(second.api_calls < cell_count as u64);
    assert_eq!(
        second.with_email + second.without_email,
        second.places_processed
    );
    assert_eq!(
        read_rows(&sink.paths().without_emails).len() as u64,
        second.places_processed
    );
}

#[tokio::test]
async fn test_stop_waits_for_in_flight_enrichment() {
    let dir = TempDir::new().unwrap();
    let sink = create_sink(dir.path());
    let region = rectangle("Busy Town", -74.1, 40.0, 0.1);

    let mut provider = StubProvider::new(4);
    provider.detail_step = Duration::from_millis(150);
    let provider = Arc::new(provider);
    let mut config = test_config(vec![region], &["plumber"], 7);
    config.max_concurrency = 8;

    let manager = ScrapingManager::new(
        config,
        provider.clone(),
        static_fetcher(""),
        Arc::clone(&sink),
    );

    let handle = manager.start();
    tokio::time::sleep(Duration::from_millis(50)).await;
    manager.stop();

    let state = handle.await.unwrap().unwrap();
    assert_eq!(state, RunState::Stopped);

    let claimed = provider
        .detail_calls
        .load(std::sync::atomic::Ordering::SeqCst) as u64;
    assert_eq!(claimed, 4);
    assert_eq!(manager.stats().places_processed, claimed);
    assert_eq!(read_rows(&sink.paths().without_emails).len() as u64, claimed);
}
