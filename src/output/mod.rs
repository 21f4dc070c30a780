//! Output module for harvested records
//!
//! This module handles:
//! - The record type and its projection onto the fixed column order
//! - Appending rows to the CSV file with per-row flushing

mod csv_sink;
mod record;

pub use csv_sink::{resolve_encoding, OutputSink};
pub use record::{Record, CITY_FIELD, LINK_FIELD, NULL_SENTINEL, OUTPUT_FIELDS, REGION_FIELD};
