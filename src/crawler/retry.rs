//! Retry policy for page downloads
//!
//! Every failed attempt is retried after a delay. The default policy never
//! gives up: a permanently unreachable URL stalls its download (and thus the
//! batch waiting on it) forever. A bounded policy turns that into
//! `HarvestError::RetriesExhausted`.

use crate::config::RetryConfig;
use crate::crawler::fetcher::FetchError;
use crate::HarvestError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently a failed download is retried
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts; `None` retries forever
    pub max_attempts: Option<u32>,

    /// Delay before the first retry
    pub delay: Duration,

    /// Multiplier applied to the delay after every retry
    pub backoff_multiplier: f64,

    /// Upper bound for the delay
    pub max_delay: Duration,

    /// Add up to 100% random jitter to each delay
    pub jitter: bool,
}

impl RetryPolicy {
    /// Retries forever with a fixed delay
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
            backoff_multiplier: 1.0,
            max_delay: delay,
            jitter: false,
        }
    }

    /// Makes at most `max_attempts` attempts with a fixed delay
    pub fn bounded(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            ..Self::unbounded(delay)
        }
    }

    /// Returns true if another attempt is allowed after `attempts` failures
    fn allows_retry(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_secs_f64(delay.as_secs_f64() * self.backoff_multiplier).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(Duration::from_secs(1))
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.delay_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter: config.jitter,
        }
    }
}

/// Runs `operation` until it succeeds or the policy runs out of attempts
///
/// Intermediate failures are logged and swallowed; only the final failure
/// of a bounded policy is returned. A failure that no retry can fix (see
/// [`FetchError::is_retryable`]) is returned at once as
/// `HarvestError::Unfetchable`.
pub async fn retry_with_policy<F, Fut, T>(
    policy: &RetryPolicy,
    url: &str,
    mut operation: F,
) -> Result<T, HarvestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempts: u32 = 0;
    let mut delay = policy.delay;

    loop {
        match operation().await {
            Ok(value) => {
                if attempts > 0 {
                    tracing::debug!(url, attempts = attempts + 1, "Fetch succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                attempts += 1;

                if !error.is_retryable() {
                    tracing::error!(url, error = %error, "URL cannot be fetched");
                    return Err(HarvestError::Unfetchable {
                        url: url.to_string(),
                        source: error,
                    });
                }

                if !policy.allows_retry(attempts) {
                    tracing::error!(url, attempts, error = %error, "Giving up on fetch");
                    return Err(HarvestError::RetriesExhausted {
                        url: url.to_string(),
                        attempts,
                        source: error,
                    });
                }

                tracing::warn!(
                    url,
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Fetch failed, retrying"
                );

                let wait = if policy.jitter { add_jitter(delay) } else { delay };
                tokio::time::sleep(wait).await;
                delay = policy.next_delay(delay);
            }
        }
    }
}

/// Jitter is uniform between 0% and 100% of the delay
fn add_jitter(delay: Duration) -> Duration {
    let factor: f64 = rand::thread_rng().gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + factor))
}
