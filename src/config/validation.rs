use crate::config::types::{Config, CrawlerConfig, OutputConfig, ProviderConfig, SearchConfig};
use crate::geo::SearchResolution;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_provider_config(&config.provider)?;
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates provider access configuration
fn validate_provider_config(config: &ProviderConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    if config.max_calls_per_second < 1 || config.max_calls_per_second > 100 {
        return Err(ConfigError::Validation(format!(
            "max-calls-per-second must be between 1 and 100, got {}",
            config.max_calls_per_second
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "keywords must contain at least one entry".to_string(),
        ));
    }

    // A blank keyword only makes sense as a pure type search
    if config.business_type.trim().is_empty()
        && config.keywords.iter().any(|k| k.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "blank keywords require a business-type".to_string(),
        ));
    }

    let resolution = SearchResolution::new(config.resolution)
        .map_err(|e| ConfigError::Validation(format!("resolution: {}", e)))?;
    let max_resolution = SearchResolution::new(config.max_resolution)
        .map_err(|e| ConfigError::Validation(format!("max-resolution: {}", e)))?;

    if max_resolution < resolution {
        return Err(ConfigError::Validation(format!(
            "max-resolution ({}) must be >= resolution ({})",
            config.max_resolution, config.resolution
        )));
    }

    if config.target_results < 1 {
        return Err(ConfigError::Validation(
            "target-results must be >= 1".to_string(),
        ));
    }

    if config.density_threshold < 1 {
        return Err(ConfigError::Validation(
            "density-threshold must be >= 1".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrency must be between 1 and 100, got {}",
            config.max_concurrency
        )));
    }

    if config.max_links < 1 {
        return Err(ConfigError::Validation(
            "max-links must be >= 1".to_string(),
        ));
    }

    if config.max_concurrent_fetches < 1 {
        return Err(ConfigError::Validation(
            "max-concurrent-fetches must be >= 1".to_string(),
        ));
    }

    if config.fetch_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file-prefix cannot be empty".to_string(),
        ));
    }

    if !config
        .file_prefix
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "file-prefix must contain only alphanumeric characters, '-' and '_', got '{}'",
            config.file_prefix
        )));
    }

    Ok(())
}
