//! Hive-Leads main entry point
//!
//! This is the command-line interface for the Hive-Leads business discovery pipeline.

use anyhow::Context;
use clap::Parser;
use hive_leads::config::{build_pipeline_config, load_config_regions, load_config_with_hash, Config};
use hive_leads::crawler::HttpPageFetcher;
use hive_leads::geo::{HexagonTiler, SearchResolution};
use hive_leads::output::{session_id, OutputPaths, PipelineStats, ResultSink};
use hive_leads::places::GooglePlacesClient;
use hive_leads::{RunState, ScrapingManager};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How often the driver logs a stats snapshot during a run
const STATS_INTERVAL: Duration = Duration::from_secs(2);

/// Hive-Leads: business discovery over hexagonal search cells
///
/// Hive-Leads tiles regions into hexagons, searches each one for businesses,
/// crawls their websites for contact details and writes the results to CSV.
#[derive(Parser, Debug)]
#[command(name = "hive-leads")]
#[command(version = "1.0.0")]
#[command(about = "Adaptive hexagon-grid business lead finder", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Load and tile the regions without calling any external service
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let base_dir = cli
        .config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    if cli.dry_run {
        handle_dry_run(&config, &base_dir)
    } else {
        handle_run(&config, &base_dir).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hive_leads=info,warn"),
            1 => EnvFilter::new("hive_leads=debug,info"),
            2 => EnvFilter::new("hive_leads=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: tiles every region and reports coverage
fn handle_dry_run(config: &Config, base_dir: &Path) -> anyhow::Result<()> {
    let resolution = SearchResolution::new(config.search.resolution)?;
    let regions = load_config_regions(config, base_dir)?;
    let tiler = HexagonTiler::new(resolution);

    println!("=== Hive-Leads Dry Run ===\n");
    println!(
        "Resolution: {} (search radius {} m)",
        resolution.name(),
        resolution.search_radius_m()
    );
    println!("Keywords: {}", config.search.keywords.join(", "));
    if !config.search.business_type.trim().is_empty() {
        println!("Business type: {}", config.search.business_type);
    }

    println!("\nRegions ({}):", regions.len());
    let mut total_cells = 0;
    for region in &regions {
        let tiling = tiler.tile_with_report(region);
        total_cells += tiling.cells.len();
        if tiling.cells.is_empty() {
            println!("  - {}: no cells, region would be skipped", region.name);
        } else {
            println!(
                "  - {}: {} cells ({:?}), coverage {:.1}%, overlap {:.2}",
                region.name,
                tiling.cells.len(),
                tiling.strategy,
                tiling.coverage.coverage_ratio * 100.0,
                tiling.coverage.overlap_ratio
            );
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would search {} cells for {} keyword(s)",
        total_cells,
        config.search.keywords.len()
    );

    Ok(())
}

/// Handles the main scraping run
async fn handle_run(config: &Config, base_dir: &Path) -> anyhow::Result<()> {
    let pipeline = build_pipeline_config(config, base_dir)?;

    let provider = GooglePlacesClient::new(
        &config.provider.base_url,
        &pipeline.api_key,
        Duration::from_secs(config.provider.request_timeout_secs),
    )?;
    let fetcher = HttpPageFetcher::new()?;

    let session = session_id(chrono::Utc::now());
    let paths = OutputPaths::for_session(
        Path::new(&config.output.directory),
        &config.output.file_prefix,
        &session,
    );
    let sink = ResultSink::create(paths, Arc::new(PipelineStats::new()))?;

    let manager = ScrapingManager::new(
        pipeline,
        Arc::new(provider),
        Arc::new(fetcher),
        Arc::new(sink),
    );
    let mut run = manager.start();

    let mut ticker = tokio::time::interval(STATS_INTERVAL);
    ticker.tick().await;

    let final_state = loop {
        tokio::select! {
            result = &mut run => {
                break result.context("scraping task panicked")??;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupt received, stopping after in-flight work");
                manager.stop();
            }
            _ = ticker.tick() => {
                tracing::info!(stats = %manager.stats(), state = %manager.state(), "Progress");
            }
        }
    };

    let stats = manager.stats();
    println!("\n=== Run {} ===", final_state);
    println!("With email:    {}", stats.with_email);
    println!("Without email: {}", stats.without_email);
    println!("Processed:     {}", stats.places_processed);
    println!("API calls:     {}", stats.api_calls);
    println!("Output:");
    println!("  {}", manager.sink().paths().with_emails.display());
    println!("  {}", manager.sink().paths().without_emails.display());

    if let RunState::Failed(message) = final_state {
        anyhow::bail!("scraping run failed: {}", message);
    }
    Ok(())
}
