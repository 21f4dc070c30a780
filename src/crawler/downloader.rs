//! Bounded concurrent downloads
//!
//! A batch of URLs is fetched cooperatively on the calling task. A fresh
//! semaphore per call caps the number of in-flight requests, and the call
//! returns only once every URL in the batch has resolved.

use crate::crawler::fetcher::{Fetcher, PageSource};
use crate::HarvestError;
use futures::future::try_join_all;
use tokio::sync::Semaphore;

/// A downloaded page paired with the URL it was requested from
pub type Downloaded = (String, String);

/// Downloads every URL in `urls` with at most `limit` requests in flight
///
/// Each result carries the URL it was requested with, so callers must not
/// rely on result order. An empty batch returns immediately without any
/// request.
///
/// # Errors
///
/// * `HarvestError::InvalidConcurrency` - `limit` is zero
/// * `HarvestError::RetriesExhausted` - a URL failed under a bounded retry policy
pub async fn download_many<S: PageSource>(
    fetcher: &Fetcher<S>,
    urls: &[String],
    limit: usize,
) -> crate::Result<Vec<Downloaded>> {
    if limit == 0 {
        return Err(HarvestError::InvalidConcurrency(limit));
    }

    if urls.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!("Downloading {} pages, {} at a time", urls.len(), limit);

    let gate = Semaphore::new(limit);

    let downloads = urls.iter().map(|url| {
        let gate = &gate;
        async move {
            // The semaphore is never closed, so acquire cannot fail.
            let _permit = gate
                .acquire()
                .await
                .map_err(|_| HarvestError::InvalidConcurrency(limit))?;
            let body = fetcher.fetch(url).await?;
            Ok::<_, HarvestError>((url.clone(), body))
        }
    });

    try_join_all(downloads).await
}
