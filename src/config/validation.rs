use crate::config::types::{Config, CrawlerConfig, OutputConfig, RetryConfig, SiteConfig};
use crate::output::resolve_encoding;
use crate::ConfigError;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_downloads < 1 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-downloads must be >= 1, got {}",
            config.max_concurrent_downloads
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts == Some(0) {
        return Err(ConfigError::Validation(
            "max-attempts must be >= 1 when set".to_string(),
        ));
    }

    if !config.backoff_multiplier.is_finite() || config.backoff_multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff-multiplier must be >= 1.0, got {}",
            config.backoff_multiplier
        )));
    }

    if config.max_delay_ms < config.delay_ms {
        return Err(ConfigError::Validation(format!(
            "max-delay-ms ({}) must not be below delay-ms ({})",
            config.max_delay_ms, config.delay_ms
        )));
    }

    Ok(())
}

/// Validates the site layout
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if !config.listing_path.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "listing-path must contain a {{page}} placeholder, got '{}'",
            config.listing_path
        )));
    }

    if config.ads_per_page < 1 {
        return Err(ConfigError::Validation(
            "ads-per-page must be >= 1".to_string(),
        ));
    }

    validate_selector(&config.listing_link_selector)?;
    validate_selector(&config.counter_selector)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    resolve_encoding(&config.encoding)?;

    Ok(())
}

fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidSelector(selector.to_string()))
}
