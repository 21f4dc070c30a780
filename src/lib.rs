//! Vacancy-Harvest: a paginated job-board crawler
//!
//! This crate walks the listing pages of a job board, downloads every
//! advertisement (and its contacts page) under a fixed concurrency cap,
//! and streams the extracted records into a CSV file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod places;
pub mod site;

use thiserror::Error;

/// Main error type for Vacancy-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Place error: {0}")]
    Place(#[from] PlaceError),

    #[error("Gave up on {url} after {attempts} attempts: {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        source: crawler::FetchError,
    },

    #[error("Cannot fetch {url}: {source}")]
    Unfetchable {
        url: String,
        source: crawler::FetchError,
    },

    #[error("Concurrency limit must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

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

    #[error("Unknown output encoding: {0}")]
    UnknownEncoding(String),

    #[error("Invalid CSS selector '{0}'")]
    InvalidSelector(String),
}

/// Place directory and target resolution errors
#[derive(Debug, Error)]
pub enum PlaceError {
    #[error("Failed to read places file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse places file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("URL for place '{0}' not found")]
    UnknownPlace(String),

    #[error("Target list {0} contains no URLs")]
    EmptyTargetList(String),
}

/// Result type alias for Vacancy-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, SiteSummary};
pub use output::{OutputSink, Record};
pub use places::{resolve_targets, PlaceDirectory};
pub use site::{RecordExtractor, RusWorkExtractor, SiteProfile};
