//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - Single-attempt GET requests with error classification
//! - Wrapping a page source in a retry policy

use crate::config::CrawlerConfig;
use crate::crawler::retry::{retry_with_policy, RetryPolicy};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a single download attempt failed
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection refused, reset, DNS failure or timeout
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// The response body could not be read
    #[error("failed to read body: {0}")]
    Body(String),

    /// The URL can never be requested
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Returns true if a later attempt may succeed
    ///
    /// Network failures and every non-success status are retried; only a
    /// malformed URL is permanent.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::InvalidUrl(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            FetchError::InvalidUrl(error.to_string())
        } else if let Some(status) = error.status() {
            FetchError::Status(status.as_u16())
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error.to_string())
        } else {
            FetchError::Connect(error.to_string())
        }
    }
}

/// Something that can make one attempt at downloading a page
///
/// The HTTP implementation is [`HttpSource`]; tests substitute in-memory
/// sources to observe concurrency and inject failures.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Makes a single attempt to download `url`, returning its body text
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use vacancy_harvest::config::CrawlerConfig;
/// use vacancy_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page source backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// Retrieves page bodies, retrying failed attempts according to a policy
///
/// With the default unbounded policy `fetch` only ever returns `Ok`: a URL
/// that never answers keeps the caller waiting.
pub struct Fetcher<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: PageSource> Fetcher<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches `url`, retrying every transient failure
    pub async fn fetch(&self, url: &str) -> crate::Result<String> {
        tracing::debug!("Fetching {}", url);
        retry_with_policy(&self.policy, url, || self.source.get(url)).await
    }
}

impl Fetcher<HttpSource> {
    /// Builds an HTTP fetcher from the crawler configuration
    pub fn http(config: &CrawlerConfig, policy: RetryPolicy) -> crate::Result<Self> {
        let client = build_http_client(config)?;
        Ok(Self::new(HttpSource::new(client), policy))
    }
}
