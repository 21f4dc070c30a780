//! Listing page walker
//!
//! Page 1 is fetched first to learn how many pages exist; pages 2..=max are
//! then fetched one at a time as the consumer asks for them. Listing pages
//! are never fetched concurrently.

use crate::crawler::fetcher::{Fetcher, PageSource};
use crate::crawler::parser::parse_total_ads;
use crate::site::SiteProfile;

/// One fetched listing page
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// 1-based page number
    pub number: u32,

    /// Last page number; 0 when page 1 carried no readable count
    pub max_page: u32,

    /// Raw page body
    pub body: String,
}

/// Lazy, forward-only sequence of listing pages for one site
pub struct PaginationWalker<'a, S> {
    fetcher: &'a Fetcher<S>,
    site: &'a SiteProfile,
    base_url: String,
    next: u32,
    max_page: Option<u32>,
}

impl<'a, S: PageSource> PaginationWalker<'a, S> {
    /// Creates a walker; nothing is fetched until [`next_page`](Self::next_page)
    pub fn new(fetcher: &'a Fetcher<S>, site: &'a SiteProfile, base_url: &str) -> Self {
        Self {
            fetcher,
            site,
            base_url: base_url.trim_end_matches('/').to_string(),
            next: 1,
            max_page: None,
        }
    }

    /// Last page number, known once page 1 has been fetched
    pub fn max_page(&self) -> Option<u32> {
        self.max_page
    }

    /// Fetches the next listing page
    ///
    /// # Returns
    ///
    /// * `Ok(Some(page))` - The next page
    /// * `Ok(None)` - The walk is finished
    /// * `Err(HarvestError)` - A page failed under a bounded retry policy
    pub async fn next_page(&mut self) -> crate::Result<Option<ListingPage>> {
        if let Some(max_page) = self.max_page {
            if self.next > max_page {
                return Ok(None);
            }
        }

        let number = self.next;
        let url = self.site.listing_url(&self.base_url, number);
        let body = self.fetcher.fetch(&url).await?;

        let max_page = match self.max_page {
            Some(max_page) => max_page,
            None => {
                let max_page = match parse_total_ads(&body, self.site) {
                    Some(total) => {
                        let max_page = self.site.max_page(total);
                        tracing::info!("{} advertisements on {} pages", total, max_page);
                        max_page
                    }
                    None => {
                        tracing::warn!(
                            "No advertisement count on {}, processing the first page only",
                            url
                        );
                        0
                    }
                };
                self.max_page = Some(max_page);
                max_page
            }
        };

        self.next += 1;

        Ok(Some(ListingPage {
            number,
            max_page,
            body,
        }))
    }
}
