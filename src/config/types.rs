use serde::Deserialize;

/// Main configuration structure for Vacancy-Harvest
///
/// Every section is optional in the TOML file; missing keys fall back to
/// the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
    /// Path to the JSON place directory
    #[serde(rename = "places-path")]
    pub places_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            retry: RetryConfig::default(),
            site: SiteConfig::default(),
            output: OutputConfig::default(),
            places_path: "cities.json".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of detail pages downloaded at once
    #[serde(rename = "max-concurrent-downloads")]
    pub max_concurrent_downloads: u32,

    /// Pause between listing pages (milliseconds)
    #[serde(rename = "page-pause-ms")]
    pub page_pause_ms: u64,

    /// Per-request timeout (seconds); a timed out request is retried
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: 10,
            page_pause_ms: 100,
            request_timeout_secs: 30,
            user_agent: format!("vacancy-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Retry behavior for page downloads
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per URL; absent means retry forever
    #[serde(rename = "max-attempts")]
    pub max_attempts: Option<u32>,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Multiplier applied to the delay after every retry (1.0 keeps it fixed)
    #[serde(rename = "backoff-multiplier")]
    pub backoff_multiplier: f64,

    /// Upper bound for the delay (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,

    /// Add random jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            delay_ms: 1000,
            backoff_multiplier: 1.0,
            max_delay_ms: 60_000,
            jitter: false,
        }
    }
}

/// Site layout: where listing pages live and how to read them
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Listing page path relative to the target URL, `{page}` is the page number
    #[serde(rename = "listing-path")]
    pub listing_path: String,

    /// Number of advertisements shown per listing page
    #[serde(rename = "ads-per-page")]
    pub ads_per_page: u32,

    /// Selector for advertisement links on a listing page
    #[serde(rename = "listing-link-selector")]
    pub listing_link_selector: String,

    /// Selector for the element holding the total advertisement count
    #[serde(rename = "counter-selector")]
    pub counter_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_path: "/vakansii/?p={page}".to_string(),
            ads_per_page: 10,
            listing_link_selector: ".v_box > .v_name > a".to_string(),
            counter_selector: ".cnt_line .tit".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV file
    pub path: String,

    /// Text encoding label of the CSV file (e.g. "utf8", "cp1251")
    pub encoding: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "parser_result.csv".to_string(),
            encoding: "utf8".to_string(),
        }
    }
}
