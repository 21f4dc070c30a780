//! Site-specific knowledge
//!
//! The crawler core only sees a [`SiteProfile`] (where listing pages live
//! and how to read them) and a [`RecordExtractor`] (how to turn an
//! advertisement page into fields). Supporting another job board with the
//! same shape means supplying these two.

mod extractor;
mod profile;

pub use extractor::{Extraction, RecordExtractor, RusWorkExtractor, KNOWN_FIELDS, TITLE_FIELD};
pub use profile::SiteProfile;
