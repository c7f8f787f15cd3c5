//! Fixed-interval rate limiting
//!
//! The listing blocks clients that request too quickly, so every catalog page
//! is followed by a pause and every detail fetch is preceded by one. The
//! interval is constant; failures do not change it.

use crate::config::CrawlerConfig;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Tracks pauses taken during a run
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Length of every pause
    interval: Duration,

    /// Number of pauses started
    pauses_taken: u64,

    /// Wall time actually spent pausing
    total_paused: Duration,
}

impl RateLimiter {
    /// Creates a limiter that pauses for `interval` each time
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pauses_taken: 0,
            total_paused: Duration::ZERO,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(Duration::from_millis(config.pause_millis))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn pauses_taken(&self) -> u64 {
        self.pauses_taken
    }

    pub fn total_paused(&self) -> Duration {
        self.total_paused
    }

    /// Blocks the pipeline for the full interval
    pub async fn pause(&mut self) {
        let started = Instant::now();
        self.pauses_taken += 1;
        tokio::time::sleep(self.interval).await;
        self.total_paused += started.elapsed();
    }

    /// Pauses for the interval unless `cancel` fires first
    ///
    /// # Returns
    ///
    /// * `true` - the full interval elapsed
    /// * `false` - cancelled before the interval elapsed
    pub async fn pause_or_cancel(&mut self, cancel: &CancellationToken) -> bool {
        let started = Instant::now();
        self.pauses_taken += 1;
        let completed = sleep_or_cancel(self.interval, cancel).await;
        self.total_paused += started.elapsed();
        completed
    }

    /// Waits `delay` before a retry; not counted as a pause
    pub async fn backoff(&mut self, delay: Duration, cancel: &CancellationToken) -> bool {
        sleep_or_cancel(delay, cancel).await
    }
}

async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = cancel.cancelled() => false,
    }
}
