use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Values given on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Raw concurrency value; kept signed so a negative value is reported
    /// as a validation error instead of a parse error
    pub max_concurrent_downloads: Option<i64>,
    pub output_path: Option<String>,
    pub output_encoding: Option<String>,
    pub places_path: Option<String>,
}

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
/// use vacancy_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Concurrency: {}", config.crawler.max_concurrent_downloads);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs appending to the same CSV can be told apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Applies command-line overrides on top of a configuration and validates the result
///
/// A concurrency value of zero or below is rejected here, before the
/// crawler ever touches the network.
pub fn apply_overrides(mut config: Config, overrides: Overrides) -> Result<Config, ConfigError> {
    if let Some(raw) = overrides.max_concurrent_downloads {
        config.crawler.max_concurrent_downloads = u32::try_from(raw)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "--n-parallel must be a positive integer, got {}",
                    raw
                ))
            })?;
    }

    if let Some(path) = overrides.output_path {
        config.output.path = path;
    }

    if let Some(encoding) = overrides.output_encoding {
        config.output.encoding = encoding;
    }

    if let Some(places) = overrides.places_path {
        config.places_path = places;
    }

    validate(&config)?;
    Ok(config)
}
