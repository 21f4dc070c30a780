use crate::config::SiteConfig;
use crate::ConfigError;
use scraper::Selector;

/// Compiled description of a job board's listing pages
#[derive(Debug, Clone)]
pub struct SiteProfile {
    listing_path: String,
    ads_per_page: u32,
    listing_links: Selector,
    counter: Selector,
}

impl SiteProfile {
    /// Compiles the selectors of a site configuration
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            listing_path: config.listing_path.clone(),
            ads_per_page: config.ads_per_page.max(1),
            listing_links: parse_selector(&config.listing_link_selector)?,
            counter: parse_selector(&config.counter_selector)?,
        })
    }

    /// URL of listing page `page` for a site rooted at `base_url`
    ///
    /// `base_url` is expected without a trailing slash.
    pub fn listing_url(&self, base_url: &str, page: u32) -> String {
        format!(
            "{}{}",
            base_url,
            self.listing_path.replace("{page}", &page.to_string())
        )
    }

    /// Last listing page for a total advertisement count
    ///
    /// Computed as `total / ads_per_page + 1`, so an exact multiple yields
    /// one trailing empty page.
    pub fn max_page(&self, total_ads: u64) -> u32 {
        let pages = total_ads / u64::from(self.ads_per_page) + 1;
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn listing_link_selector(&self) -> &Selector {
        &self.listing_links
    }

    pub fn counter_selector(&self) -> &Selector {
        &self.counter
    }
}

fn parse_selector(css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|_| ConfigError::InvalidSelector(css.to_string()))
}
