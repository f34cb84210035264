use crate::geo::{Region, SearchResolution};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Hive-Leads
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "region")]
    pub regions: Vec<RegionEntry>,
}

/// Place-search provider access configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderConfig {
    /// API credential; falls back to the `HIVE_LEADS_API_KEY` environment variable when empty
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the place web service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sliding-window limit shared by every provider call
    #[serde(default = "default_max_calls_per_second")]
    pub max_calls_per_second: u32,

    /// Timeout for a single provider request
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay before a page token may be used
    #[serde(default = "default_page_token_delay_ms")]
    pub page_token_delay_ms: u64,

    /// Pause after an OVER_QUERY_LIMIT status
    #[serde(default = "default_over_query_limit_backoff_ms")]
    pub over_query_limit_backoff_ms: u64,
}

/// What to search for and how finely to tile
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Keywords, processed one after another per region
    pub keywords: Vec<String>,

    /// Optional provider place type filter
    #[serde(default)]
    pub business_type: String,

    /// Starting H3 resolution
    #[serde(default = "default_resolution")]
    pub resolution: u8,

    /// Dense cells are never subdivided past this resolution
    #[serde(default = "default_max_resolution")]
    pub max_resolution: u8,

    /// Stop once this many email-bearing records were written
    #[serde(default = "default_target_results")]
    pub target_results: u64,

    /// Result count at which a cell counts as saturated
    #[serde(default = "default_density_threshold")]
    pub density_threshold: usize,

    /// Maximum result pages fetched per cell
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

/// Website contact crawling configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Size of the enrichment worker pool
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Maximum pages crawled per business website
    #[serde(default = "default_max_links")]
    pub max_links: usize,

    /// Maximum simultaneous page fetches per website
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Timeout for a single page fetch
    #[serde(default = "default_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_links: default_max_links(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            fetch_timeout_secs: default_timeout_secs(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the CSV files are created in
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// File name prefix shared by both CSV files
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            file_prefix: default_file_prefix(),
        }
    }
}

/// A GeoJSON file contributing one region per feature
#[derive(Debug, Clone, Deserialize)]
pub struct RegionEntry {
    pub geojson: String,
}

/// The frozen parameters of one pipeline run
///
/// Built once from a [`Config`] plus the loaded regions. Shared behind an `Arc`
/// and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_key: String,
    pub regions: Vec<Region>,
    pub keywords: Vec<String>,
    pub business_type: String,
    pub resolution: SearchResolution,
    pub max_resolution: SearchResolution,
    pub target_results: u64,
    pub max_concurrency: usize,
    pub max_links: usize,
    pub max_concurrent_fetches: usize,
    pub density_threshold: usize,
    pub max_pages: u32,
    pub max_calls_per_second: u32,
    pub page_token_delay: Duration,
    pub over_query_limit_backoff: Duration,
    pub fetch_timeout: Duration,
}

fn default_base_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

fn default_max_calls_per_second() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_page_token_delay_ms() -> u64 {
    2000
}

fn default_over_query_limit_backoff_ms() -> u64 {
    5000
}

fn default_resolution() -> u8 {
    7
}

fn default_max_resolution() -> u8 {
    11
}

fn default_target_results() -> u64 {
    100
}

fn default_density_threshold() -> usize {
    58
}

fn default_max_pages() -> u32 {
    3
}

fn default_max_concurrency() -> u32 {
    10
}

fn default_max_links() -> usize {
    25
}

fn default_max_concurrent_fetches() -> usize {
    10
}

fn default_output_directory() -> String {
    "./output".to_string()
}

fn default_file_prefix() -> String {
    "leads".to_string()
}
