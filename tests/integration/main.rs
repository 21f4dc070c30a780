//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small job board and run the full
//! crawl cycle end-to-end against it.

mod crawl_tests;
