//! Crawler module for page fetching and record harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a configurable retry policy
//! - Bounded concurrent downloads
//! - Listing page parsing and pagination
//! - Overall crawl coordination

mod coordinator;
mod downloader;
mod fetcher;
mod pagination;
mod parser;
mod retry;

pub use coordinator::{Coordinator, SiteSummary};
pub use downloader::{download_many, Downloaded};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpSource, PageSource};
pub use pagination::{ListingPage, PaginationWalker};
pub use parser::{extract_detail_links, parse_count, parse_total_ads, resolve_link};
pub use retry::{retry_with_policy, RetryPolicy};

use crate::config::Config;
use crate::places::PlaceDirectory;
use std::path::Path;

/// Runs a complete harvest over `targets`
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP fetcher and site profile from the configuration
/// 2. Crawl each target in turn
/// 3. Append every record to the configured output file
///
/// # Example
///
/// ```no_run
/// use vacancy_harvest::config::Config;
/// use vacancy_harvest::crawler::harvest;
/// use vacancy_harvest::places::PlaceDirectory;
///
/// # async fn example() -> Result<(), vacancy_harvest::HarvestError> {
/// let targets = vec!["https://perm.rus-work.com".to_string()];
/// harvest(&Config::default(), PlaceDirectory::default(), &targets).await?;
/// # Ok(())
/// # }
/// ```
pub async fn harvest(
    config: &Config,
    places: PlaceDirectory,
    targets: &[String],
) -> crate::Result<Vec<SiteSummary>> {
    let coordinator = Coordinator::from_config(config, places)?;
    coordinator
        .run(targets, Path::new(&config.output.path), &config.output.encoding)
        .await
}
