use crate::config::types::{Config, PipelineConfig};
use crate::config::validation::validate;
use crate::geo::{load_regions, Region, SearchResolution};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

/// Environment variable consulted when the config file leaves `api-key` empty
pub const API_KEY_ENV: &str = "HIVE_LEADS_API_KEY";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use hive_leads::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Resolution: {}", config.search.resolution);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so output files can be traced back to the config that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Loads every region from the configured GeoJSON files, in config order
///
/// Errors if a file cannot be read or parsed, or if no regions were found.
pub fn load_config_regions(config: &Config, base_dir: &Path) -> Result<Vec<Region>, ConfigError> {
    let mut regions = Vec::new();
    for entry in &config.regions {
        let path = base_dir.join(&entry.geojson);
        let loaded = load_regions(&path).map_err(|source| ConfigError::Region {
            path: path.display().to_string(),
            source,
        })?;
        regions.extend(loaded);
    }

    if regions.is_empty() {
        return Err(ConfigError::Validation(
            "no regions were loaded from the configured GeoJSON files".to_string(),
        ));
    }

    Ok(regions)
}

/// Freezes a validated [`Config`] into the parameters of one run
///
/// Region files are loaded here; relative paths are resolved against `base_dir`
/// (normally the directory holding the config file).
pub fn build_pipeline_config(config: &Config, base_dir: &Path) -> Result<PipelineConfig, ConfigError> {
    let api_key = if config.provider.api_key.trim().is_empty() {
        std::env::var(API_KEY_ENV).unwrap_or_default()
    } else {
        config.provider.api_key.trim().to_string()
    };

    if api_key.is_empty() {
        return Err(ConfigError::Validation(format!(
            "api-key is empty and {} is not set",
            API_KEY_ENV
        )));
    }

    let regions = load_config_regions(config, base_dir)?;

    let resolution = SearchResolution::new(config.search.resolution)
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
    let max_resolution = SearchResolution::new(config.search.max_resolution)
        .map_err(|e| ConfigError::Validation(e.to_string()))?;

    Ok(PipelineConfig {
        api_key,
        regions,
        keywords: config.search.keywords.clone(),
        business_type: config.search.business_type.trim().to_string(),
        resolution,
        max_resolution,
        target_results: config.search.target_results,
        max_concurrency: config.crawler.max_concurrency as usize,
        max_links: config.crawler.max_links,
        max_concurrent_fetches: config.crawler.max_concurrent_fetches,
        density_threshold: config.search.density_threshold,
        max_pages: config.search.max_pages,
        max_calls_per_second: config.provider.max_calls_per_second,
        page_token_delay: Duration::from_millis(config.provider.page_token_delay_ms),
        over_query_limit_backoff: Duration::from_millis(config.provider.over_query_limit_backoff_ms),
        fetch_timeout: Duration::from_secs(config.crawler.fetch_timeout_secs),
    })
}
