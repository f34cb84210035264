//! Hive-Leads: business discovery over hexagonal search cells
//!
//! This crate tiles arbitrary polygon regions into H3 cells, queries a place-search
//! provider per cell (subdividing cells that saturate the provider's result cap),
//! deduplicates places across the whole run, crawls each business website for
//! contact emails and social profiles, and streams the enriched rows into two
//! CSV files split by whether an email was found.

pub mod config;
pub mod crawler;
pub mod geo;
pub mod output;
pub mod pipeline;
pub mod places;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Hive-Leads operations
#[derive(Debug, Error)]
pub enum HiveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Geometry error: {0}")]
    Geo(#[from] GeoError),

    #[error("Output error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("Provider error: {0}")]
    Provider(#[from] places::ProviderError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid run state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Failed to load region file {path}: {source}")]
    Region {
        path: String,
        #[source]
        source: GeoError,
    },
}

/// Geometry and region loading errors
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Failed to read GeoJSON: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse GeoJSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported resolution {0} (expected 5..=11)")]
    UnsupportedResolution(u8),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Hive-Leads operations
pub type Result<T> = std::result::Result<T, HiveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, PipelineConfig};
pub use output::{PipelineStats, ResultSink, StatsSnapshot};
pub use pipeline::ScrapingManager;
pub use state::RunState;
