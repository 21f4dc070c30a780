//! Record extraction from advertisement pages
//!
//! Extraction never fails: anything that cannot be found is left out of
//! the returned field map.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Fields recognised in `Key: value` parameter lines of an advertisement
pub const KNOWN_FIELDS: &[&str] = &[
    "Пол",
    "Возраст",
    "Образование",
    "Опыт работы",
    "Компания",
    "График работы",
    "Зарплата",
    "Телефон",
    "Контактное лицо",
    "E-mail",
    "Вакансия размещена",
    "Адрес",
    "Занятость",
];

/// Field holding the vacancy title
pub const TITLE_FIELD: &str = "Вакансия";

/// Fields extracted from one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Field name to value
    pub fields: HashMap<String, String>,

    /// Link (possibly relative) to the page holding the remaining contact fields
    pub contacts_link: Option<String>,
}

/// Turns the raw HTML of an advertisement page into fields
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Extraction;
}

/// Extractor for rus-work.com advertisement and contacts pages
///
/// Both page kinds share the same markup, so one extractor serves both
/// extraction rounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RusWorkExtractor;

impl RecordExtractor for RusWorkExtractor {
    fn extract(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);

        let mut params = select_texts(&document, ".card_ogz > div");
        params.extend(select_texts(&document, ".card_adr"));
        params.extend(contact_lines(&document));

        let mut fields = HashMap::new();
        for param in &params {
            if let Some((key, value)) = split_param(param) {
                fields.insert(key.to_string(), value);
            }
        }

        if let Some(title) = select_texts(&document, ".vid_tit").into_iter().next() {
            fields.insert(TITLE_FIELD.to_string(), title);
        }

        let contacts_link = Selector::parse(".otklik > a").ok().and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| href.trim().to_string())
                .filter(|href| !href.is_empty())
        });

        Extraction {
            fields,
            contacts_link,
        }
    }
}

/// Matches a `Key: value` line against the known field set
fn split_param(param: &str) -> Option<(&'static str, String)> {
    KNOWN_FIELDS.iter().find_map(|key| {
        param
            .strip_prefix(key)
            .and_then(|rest| rest.strip_prefix(':'))
            .map(|value| (*key, value.trim().to_string()))
    })
}

/// Cleaned text of every element matching `css`
fn select_texts(document: &Html, css: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| clean_text(&element_text(element)))
        .collect()
}

/// Contact blocks hold several parameters separated by `<br>`
fn contact_lines(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(".card_contact") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .flat_map(|block| {
            line_break()
                .split(&block.inner_html())
                .map(|fragment| {
                    let fragment = Html::parse_fragment(fragment);
                    clean_text(&element_text(fragment.root_element()))
                })
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn line_break() -> &'static Regex {
    static LINE_BREAK: OnceLock<Regex> = OnceLock::new();
    LINE_BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern is valid"))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Drops line breaks, tabs and non-breaking spaces, then trims
fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\n' | '\t' | '\r' | '\u{a0}'))
        .collect::<String>()
        .trim()
        .to_string()
}
