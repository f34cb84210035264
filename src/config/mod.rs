//! Configuration module for Hive-Leads
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and freezing them into the [`PipelineConfig`] of a run.
//!
//! # Example
//!
//! ```no_run
//! use hive_leads::config::{build_pipeline_config, load_config};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! let pipeline = build_pipeline_config(&config, Path::new(".")).unwrap();
//! println!("Searching {} regions", pipeline.regions.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, PipelineConfig, ProviderConfig, RegionEntry,
    SearchConfig,
};

// Re-export parser functions
pub use parser::{
    build_pipeline_config, compute_config_hash, load_config, load_config_regions,
    load_config_with_hash, API_KEY_ENV,
};
