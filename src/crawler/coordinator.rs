//! Crawler coordinator - main crawl orchestration logic
//!
//! For every target site the coordinator:
//! - Resolves the city/region labels of the site
//! - Makes sure the output file exists with its header row
//! - Walks the listing pages one by one
//! - Downloads the advertisements of each page concurrently, then their
//!   contacts pages
//! - Merges both extraction rounds and appends the records to the output

use crate::config::Config;
use crate::crawler::downloader::download_many;
use crate::crawler::fetcher::{FetchError, Fetcher, HttpSource, PageSource};
use crate::crawler::pagination::{ListingPage, PaginationWalker};
use crate::crawler::parser::{extract_detail_links, resolve_link};
use crate::crawler::retry::RetryPolicy;
use crate::output::{OutputSink, Record, CITY_FIELD, LINK_FIELD, NULL_SENTINEL, REGION_FIELD};
use crate::places::{PlaceDirectory, PlaceLabels};
use crate::site::{RecordExtractor, RusWorkExtractor, SiteProfile};
use crate::HarvestError;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Outcome of crawling one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSummary {
    /// Normalized site URL
    pub target: String,

    pub city: String,

    pub region: String,

    /// Listing pages processed
    pub pages: u32,

    /// Records appended to the output
    pub records: u64,
}

/// An advertisement waiting for its contacts page
struct PendingRecord {
    record: Record,
    contacts_url: Option<String>,
}

/// Main crawler coordinator structure
pub struct Coordinator<S, E> {
    fetcher: Fetcher<S>,
    extractor: E,
    site: SiteProfile,
    places: PlaceDirectory,
    concurrency: usize,
    page_pause: Duration,
}

impl Coordinator<HttpSource, RusWorkExtractor> {
    /// Creates an HTTP coordinator for rus-work.com from a validated configuration
    pub fn from_config(config: &Config, places: PlaceDirectory) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::http(&config.crawler, RetryPolicy::from(&config.retry))?;
        let site = SiteProfile::from_config(&config.site)?;

        Ok(Self::new(fetcher, RusWorkExtractor, site, places)
            .with_concurrency(config.crawler.max_concurrent_downloads as usize)?
            .with_page_pause(Duration::from_millis(config.crawler.page_pause_ms)))
    }
}

impl<S: PageSource, E: RecordExtractor> Coordinator<S, E> {
    /// Creates a coordinator with 10 concurrent downloads and a 100ms pause between pages
    pub fn new(fetcher: Fetcher<S>, extractor: E, site: SiteProfile, places: PlaceDirectory) -> Self {
        Self {
            fetcher,
            extractor,
            site,
            places,
            concurrency: 10,
            page_pause: Duration::from_millis(100),
        }
    }

    /// Sets the maximum number of concurrent page downloads
    pub fn with_concurrency(mut self, concurrency: usize) -> Result<Self, HarvestError> {
        if concurrency == 0 {
            return Err(HarvestError::InvalidConcurrency(concurrency));
        }
        self.concurrency = concurrency;
        Ok(self)
    }

    /// Sets the pause between two listing pages
    pub fn with_page_pause(mut self, pause: Duration) -> Self {
        self.page_pause = pause;
        self
    }

    /// Crawls every target in order, appending to one output file
    ///
    /// A site that fails under a bounded retry policy, or whose URL can
    /// never be fetched, is logged and skipped; any other error aborts the
    /// run.
    pub async fn run(
        &self,
        targets: &[String],
        output_path: &Path,
        encoding: &str,
    ) -> Result<Vec<SiteSummary>, HarvestError> {
        let mut summaries = Vec::with_capacity(targets.len());

        for (i, target) in targets.iter().enumerate() {
            tracing::info!("Site {}/{}: {}", i + 1, targets.len(), target);

            match self.site_parse(target, output_path, encoding).await {
                Ok(summary) => summaries.push(summary),
                Err(e @ HarvestError::RetriesExhausted { .. })
                | Err(e @ HarvestError::Unfetchable { .. }) => {
                    tracing::error!("Skipping {}: {}", target, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summaries)
    }

    /// Crawls one site and appends its records to `output_path`
    ///
    /// # Arguments
    ///
    /// * `target` - Root URL of the site (a trailing slash is ignored)
    /// * `output_path` - CSV file; created with a header row if missing
    /// * `encoding` - Text encoding label of the CSV file
    pub async fn site_parse(
        &self,
        target: &str,
        output_path: &Path,
        encoding: &str,
    ) -> Result<SiteSummary, HarvestError> {
        let base = target.trim().trim_end_matches('/');
        let base_url = Url::parse(base)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(HarvestError::Unfetchable {
                url: base.to_string(),
                source: FetchError::InvalidUrl(format!(
                    "unsupported scheme '{}'",
                    base_url.scheme()
                )),
            });
        }

        let labels = self.places.region_and_city(base).unwrap_or_else(|| {
            tracing::warn!("{} is not in the places directory, city and region unknown", base);
            PlaceLabels {
                city: NULL_SENTINEL.to_string(),
                region: NULL_SENTINEL.to_string(),
            }
        });

        let mut sink = OutputSink::open(output_path, encoding)?;
        let mut walker = PaginationWalker::new(&self.fetcher, &self.site, base);
        let mut pages = 0;

        while let Some(page) = walker.next_page().await? {
            let written = self
                .process_listing_page(&page, &base_url, &labels, &mut sink)
                .await?;
            pages += 1;

            tracing::info!(
                "Page {}/{} of {}: {} records",
                page.number,
                page.max_page,
                base,
                written
            );

            tokio::time::sleep(self.page_pause).await;
        }

        let summary = SiteSummary {
            target: base.to_string(),
            city: labels.city,
            region: labels.region,
            pages,
            records: sink.rows_written(),
        };

        tracing::info!(
            "Finished {}: {} pages, {} records",
            summary.target,
            summary.pages,
            summary.records
        );

        Ok(summary)
    }

    /// Downloads, extracts and writes every advertisement of one listing page
    ///
    /// Returns the number of records written.
    async fn process_listing_page(
        &self,
        page: &ListingPage,
        base_url: &Url,
        labels: &PlaceLabels,
        sink: &mut OutputSink,
    ) -> Result<u64, HarvestError> {
        let links = extract_detail_links(&page.body, base_url, &self.site);
        if links.is_empty() {
            tracing::debug!("No advertisements on page {}", page.number);
            return Ok(0);
        }

        // Round one: advertisement pages
        let details: HashMap<String, String> = download_many(&self.fetcher, &links, self.concurrency)
            .await?
            .into_iter()
            .collect();

        let mut pending = Vec::with_capacity(links.len());
        for link in &links {
            let Some(body) = details.get(link) else {
                tracing::warn!("No body downloaded for {}", link);
                continue;
            };
            pending.push(self.primary_record(link, body, labels));
        }

        // Round two: contacts pages, paired back by URL rather than position
        let contacts_urls: Vec<String> = pending
            .iter()
            .filter_map(|p| p.contacts_url.clone())
            .collect();
        let contacts: HashMap<String, String> =
            download_many(&self.fetcher, &contacts_urls, self.concurrency)
                .await?
                .into_iter()
                .collect();

        let mut written = 0;
        for PendingRecord {
            mut record,
            contacts_url,
        } in pending
        {
            if let Some(body) = contacts_url.as_ref().and_then(|url| contacts.get(url)) {
                record.merge(self.extractor.extract(body).fields);
            }

            sink.append_row(&record)?;
            written += 1;
        }

        Ok(written)
    }

    /// First extraction round: advertisement fields plus site labels
    fn primary_record(&self, link: &str, body: &str, labels: &PlaceLabels) -> PendingRecord {
        let extraction = self.extractor.extract(body);

        let mut record = Record::new(extraction.fields);
        record.set(CITY_FIELD, labels.city.as_str());
        record.set(REGION_FIELD, labels.region.as_str());
        record.set(LINK_FIELD, link);

        let contacts_url = extraction.contacts_link.and_then(|href| {
            Url::parse(link)
                .ok()
                .and_then(|detail_url| resolve_link(&href, &detail_url))
        });

        if contacts_url.is_none() {
            tracing::debug!("No contacts link on {}", link);
        }

        PendingRecord {
            record,
            contacts_url,
        }
    }
}
