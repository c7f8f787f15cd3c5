//! Progress reporting for a pipeline run
//!
//! The pipeline reports through a [`ProgressObserver`] and never writes to a
//! terminal itself. Front ends decide how to render events: the CLI logs them,
//! a windowed front end can read them from a channel.

use crate::output::stats::RunSummary;
use crate::output::traits::SinkMode;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    RunStarted {
        start_page: u32,
        /// Pages this run will cover
        pages: u32,
        mode: SinkMode,
        output: String,
        fast_mode: bool,
    },

    PageStarted {
        page: u32,
        url: String,
    },

    RecordWritten {
        page: u32,
        /// Overall position in the listing, 1-based
        rank: u32,
        title: String,
        enriched: bool,
    },

    ItemSkipped {
        page: u32,
        rank: u32,
        reason: String,
    },

    EnrichmentFailed {
        page: u32,
        title: String,
        reason: String,
    },

    PageFinished {
        page: u32,
        records: usize,
    },

    Paused {
        page: u32,
        duration: Duration,
    },

    RunAborted {
        page: u32,
        reason: String,
    },

    RunCancelled {
        next_page: u32,
    },

    RunFinished {
        summary: RunSummary,
    },
}

/// Receives progress events
///
/// Implementations must be `Send + Sync`; the pipeline may run on a worker
/// thread.
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

/// Ignores every event
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn on_event(&self, _event: &ProgressEvent) {}
}

/// Forwards events over a channel; a closed receiver is ignored
impl ProgressObserver for UnboundedSender<ProgressEvent> {
    fn on_event(&self, event: &ProgressEvent) {
        let _ = self.send(event.clone());
    }
}

/// Renders an event through `tracing`
pub fn log_event(event: &ProgressEvent) {
    match event {
        ProgressEvent::RunStarted {
            start_page,
            pages,
            mode,
            output,
            fast_mode,
        } => {
            if *start_page == 1 {
                tracing::info!("Starting crawl, results will be saved to {}", output);
            } else {
                tracing::info!(
                    "Resuming crawl from page {}, results will be appended to {}",
                    start_page,
                    output
                );
            }
            tracing::debug!(
                "{} pages to crawl, output mode: {}, fast mode: {}",
                pages,
                mode.as_str(),
                fast_mode
            );
        }
        ProgressEvent::PageStarted { page, url } => {
            tracing::info!("Crawling page {} ({})", page, url);
        }
        ProgressEvent::RecordWritten {
            rank,
            title,
            enriched,
            ..
        } => {
            if *enriched {
                tracing::info!("[{}] {} (detail page)", rank, title);
            } else {
                tracing::info!("[{}] {}", rank, title);
            }
        }
        ProgressEvent::ItemSkipped { page, rank, reason } => {
            tracing::warn!("Skipped entry {} on page {}: {}", rank, page, reason);
        }
        ProgressEvent::EnrichmentFailed {
            page,
            title,
            reason,
        } => {
            tracing::warn!(
                "Kept catalog credits for {} on page {}: {}",
                title,
                page,
                reason
            );
        }
        ProgressEvent::PageFinished { page, records } => {
            tracing::info!("Page {} done, {} records written", page, records);
        }
        ProgressEvent::Paused { page, duration } => {
            tracing::debug!("Pausing {:?} after page {}", duration, page);
        }
        ProgressEvent::RunAborted { page, reason } => {
            tracing::error!("Crawl stopped on page {}: {}", page, reason);
        }
        ProgressEvent::RunCancelled { next_page } => {
            tracing::info!("Crawl cancelled, next page is {}", next_page);
        }
        ProgressEvent::RunFinished { summary } => {
            tracing::info!(
                "Crawl finished: {} records from {} pages",
                summary.records_written,
                summary.pages_completed
            );
        }
    }
}
