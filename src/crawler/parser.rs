//! Listing page parsing
//!
//! This module reads the two things the crawler needs from a listing page:
//! - The total advertisement count (to size the walk)
//! - Links to the advertisement detail pages

use crate::site::SiteProfile;
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;
use url::Url;

/// Reads the total advertisement count from a listing page
///
/// The counter element holds text such as `Найдено 1 234 вакансии`; the
/// first run of digits (with any embedded whitespace) is taken as the
/// count.
///
/// # Returns
///
/// * `Some(count)` - A count was found
/// * `None` - The counter element is missing or holds no digits
pub fn parse_total_ads(html: &str, site: &SiteProfile) -> Option<u64> {
    let document = Html::parse_document(html);
    let counter = document.select(site.counter_selector()).next()?;
    let text: String = counter.text().collect();
    parse_count(&text)
}

/// Parses the first whitespace-tolerant number in `text`
///
/// # Example
///
/// ```
/// use vacancy_harvest::crawler::parse_count;
///
/// assert_eq!(parse_count("Найдено 3 7 вакансий"), Some(37));
/// assert_eq!(parse_count("Вакансий нет"), None);
/// ```
pub fn parse_count(text: &str) -> Option<u64> {
    static COUNT: OnceLock<Regex> = OnceLock::new();
    let pattern = COUNT.get_or_init(|| Regex::new(r"\d[\d\s]*").expect("count pattern is valid"));

    let digits: String = pattern
        .find(text)?
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    digits.parse().ok()
}

/// Extracts absolute advertisement links from a listing page
///
/// Relative links are resolved against `base_url`. Links that do not
/// resolve to an HTTP(S) URL are dropped, as are duplicates.
pub fn extract_detail_links(html: &str, base_url: &Url, site: &SiteProfile) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links: Vec<String> = Vec::new();

    for element in document.select(site.listing_link_selector()) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(absolute) = resolve_link(href, base_url) {
            if !links.contains(&absolute) {
                links.push(absolute);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None for empty, fragment-only, `javascript:` and `mailto:`
/// hrefs and for anything that fails to parse.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
