//! Place directory and crawl target resolution
//!
//! The directory is a JSON object keyed by city name:
//!
//! ```json
//! { "Пермь": { "region": "Пермский край", "url": "https://perm.rus-work.com" } }
//! ```
//!
//! It maps place names to site URLs and, in reverse, site URLs to the
//! city/region labels written into every record.

use crate::PlaceError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// Keyword selecting every place in the directory
pub const ALL_PLACES: &str = "all";

/// One city entry of the directory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaceEntry {
    pub region: String,
    pub url: String,
}

/// City/region labels of a crawl target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceLabels {
    pub city: String,
    pub region: String,
}

/// Static lookup between place names and site URLs
#[derive(Debug, Clone, Default)]
pub struct PlaceDirectory {
    places: BTreeMap<String, PlaceEntry>,
}

impl PlaceDirectory {
    /// Loads a directory from a JSON file
    ///
    /// A missing file gives an empty directory so that raw URL targets
    /// still work (with unknown labels).
    pub fn load(path: &Path) -> Result<Self, PlaceError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Places file {} not found, city and region will be unknown",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_json(content: &str) -> Result<Self, PlaceError> {
        let places: BTreeMap<String, PlaceEntry> = serde_json::from_str(content)?;
        Ok(Self { places })
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// URL of a place, matching the name exactly first and then ignoring case
    pub fn url_for(&self, name: &str) -> Option<&str> {
        if let Some(entry) = self.places.get(name) {
            return Some(&entry.url);
        }

        let wanted = name.to_lowercase();
        self.places
            .iter()
            .find(|(city, _)| city.to_lowercase() == wanted)
            .map(|(_, entry)| entry.url.as_str())
    }

    /// URLs of every place in the directory
    pub fn all_urls(&self) -> Vec<String> {
        self.places.values().map(|entry| entry.url.clone()).collect()
    }

    /// City and region of a site URL, ignoring trailing slashes
    pub fn region_and_city(&self, url: &str) -> Option<PlaceLabels> {
        let url = url.trim_end_matches('/');
        self.places
            .iter()
            .find(|(_, entry)| entry.url.trim_end_matches('/') == url)
            .map(|(city, entry)| PlaceLabels {
                city: city.clone(),
                region: entry.region.clone(),
            })
    }
}

/// Turns a target selector into the list of site URLs to crawl
///
/// The selector is, in order of precedence:
/// 1. `all` (any case) - every URL in the directory
/// 2. An absolute URL - that URL
/// 3. A path to an existing file - one URL per line
/// 4. A place name - its URL from the directory
///
/// # Errors
///
/// * `PlaceError::UnknownPlace` - the place name is not in the directory
/// * `PlaceError::EmptyTargetList` - a target file holds no URLs
pub fn resolve_targets(selector: &str, places: &PlaceDirectory) -> Result<Vec<String>, PlaceError> {
    let selector = selector.trim();

    if selector.eq_ignore_ascii_case(ALL_PLACES) {
        return Ok(places.all_urls());
    }

    if Url::parse(selector).is_ok() {
        return Ok(vec![selector.to_string()]);
    }

    let path = Path::new(selector);
    if path.is_file() {
        let content = std::fs::read_to_string(path)?;
        let urls: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if urls.is_empty() {
            return Err(PlaceError::EmptyTargetList(selector.to_string()));
        }
        return Ok(urls);
    }

    places
        .url_for(selector)
        .map(|url| vec![url.to_string()])
        .ok_or_else(|| PlaceError::UnknownPlace(selector.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PLACES: &str = r#"{
        "Пермь": { "region": "Пермский край", "url": "https://perm.rus-work.com" },
        "Мирный": { "region": "Архангельская область", "url": "https://mirniy-arhangelsk.rus-work.com/" }
    }"#;

    fn directory() -> PlaceDirectory {
        PlaceDirectory::from_json(PLACES).unwrap()
    }

    #[test]
    fn test_url_for_exact_and_case_insensitive() {
        let places = directory();
        assert_eq!(places.url_for("Пермь"), Some("https://perm.rus-work.com"));
        assert_eq!(places.url_for("пермь"), Some("https://perm.rus-work.com"));
        assert_eq!(places.url_for("ПЕРМЬ"), Some("https://perm.rus-work.com"));
        assert_eq!(places.url_for("Казань"), None);
    }

    #[test]
    fn test_region_and_city_ignores_trailing_slash() {
        let places = directory();
        let labels = places
            .region_and_city("https://mirniy-arhangelsk.rus-work.com")
            .unwrap();
        assert_eq!(labels.city, "Мирный");
        assert_eq!(labels.region, "Архангельская область");

        assert!(places.region_and_city("https://perm.rus-work.com/").is_some());
        assert!(places.region_and_city("https://kazan.rus-work.com").is_none());
    }

    #[test]
    fn test_resolve_all() {
        let urls = resolve_targets("ALL", &directory()).unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn test_resolve_url() {
        let urls = resolve_targets("https://kazan.rus-work.com", &directory()).unwrap();
        assert_eq!(urls, vec!["https://kazan.rus-work.com"]);
    }

    #[test]
    fn test_resolve_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "https://perm.rus-work.com  ").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "https://kazan.rus-work.com").unwrap();
        file.flush().unwrap();

        let urls = resolve_targets(file.path().to_str().unwrap(), &directory()).unwrap();
        assert_eq!(
            urls,
            vec!["https://perm.rus-work.com", "https://kazan.rus-work.com"]
        );
    }

    #[test]
    fn test_resolve_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let result = resolve_targets(file.path().to_str().unwrap(), &directory());
        assert!(matches!(result, Err(PlaceError::EmptyTargetList(_))));
    }

    #[test]
    fn test_resolve_place_name() {
        let urls = resolve_targets("пермь", &directory()).unwrap();
        assert_eq!(urls, vec!["https://perm.rus-work.com"]);
    }

    #[test]
    fn test_unknown_place_is_an_error() {
        let result = resolve_targets("Атлантида", &directory());
        assert!(matches!(result, Err(PlaceError::UnknownPlace(_))));
    }

    #[test]
    fn test_missing_places_file_is_empty() {
        let places = PlaceDirectory::load(Path::new("/nonexistent/cities.json")).unwrap();
        assert!(places.is_empty());
    }
}
