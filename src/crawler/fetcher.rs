//! HTTP fetcher implementation
//!
//! This module handles all outbound requests, including:
//! - Building the HTTP client with the browser User-Agent and bounded timeouts
//! - GET requests returning page markup
//! - Optional bounded retry with exponential backoff for catalog pages

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::throttle::RateLimiter;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header sent with every request
/// * `crawler` - Supplies the request and connect timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use douban_top250::config::{CrawlerConfig, UserAgentConfig};
/// use douban_top250::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.value.as_str())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body
///
/// No retries happen here; callers decide what a failure means.
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(body)` |
/// | other status | `FetchError::Status` |
/// | transport error or timeout | `FetchError::Http` |
/// | unreadable body | `FetchError::Body` |
pub async fn fetch_url(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })
}

/// How many times to re-attempt a failed fetch, and how long to wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first; 0 means fail immediately
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each further retry
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.retry_backoff_millis),
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }
}

/// Fetches a URL, retrying per `policy`
///
/// Backoff waits go through the rate limiter so they can be cancelled, but
/// they are not counted as pauses.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    policy: RetryPolicy,
    limiter: &mut RateLimiter,
    cancel: &CancellationToken,
) -> Result<String, FetchError> {
    let mut attempt = 0;
    loop {
        match fetch_url(client, url).await {
            Ok(body) => return Ok(body),
            Err(e) if attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    "Fetch of {} failed ({}), retry {}/{} in {:?}",
                    url,
                    e,
                    attempt,
                    policy.max_retries,
                    delay
                );
                if !limiter.backoff(delay, cancel).await {
                    return Err(FetchError::Cancelled {
                        url: url.to_string(),
                    });
                }
            }
            Err(e) => return Err(e),
        }
    }
}
