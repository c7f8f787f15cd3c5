//! Run statistics
//!
//! A [`RunSummary`] is produced by every run that reaches a page boundary
//! cleanly, whether it finished the listing or was cancelled.

use crate::state::PAGE_COUNT;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every page through the last one was processed
    Completed,

    /// Stopped at a page boundary on request
    Cancelled,
}

/// Statistics for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// First page processed by this run
    pub start_page: u32,

    /// Page a follow-up run should resume from; `PAGE_COUNT + 1` when done
    pub next_page: u32,

    pub pages_completed: u32,
    pub records_written: u64,

    /// Records whose credits came from the detail page
    pub records_enriched: u64,

    /// Records that kept catalog credits because enrichment failed
    pub enrichment_failures: u64,

    /// Entries skipped because their markup was malformed
    pub extraction_failures: u64,

    /// Rate-limiter pauses taken
    pub pauses: u64,

    /// Wall time spent in those pauses
    pub time_paused: Duration,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
}

impl RunSummary {
    /// Creates an empty summary for a run starting now
    pub fn begin(start_page: u32) -> Self {
        let now = Utc::now();
        Self {
            start_page,
            next_page: start_page,
            pages_completed: 0,
            records_written: 0,
            records_enriched: 0,
            enrichment_failures: 0,
            extraction_failures: 0,
            pauses: 0,
            time_paused: Duration::ZERO,
            started_at: now,
            finished_at: now,
            outcome: RunOutcome::Completed,
        }
    }

    /// Stamps the end of the run
    pub fn finish(
        mut self,
        outcome: RunOutcome,
        next_page: u32,
        pauses: u64,
        time_paused: Duration,
    ) -> Self {
        self.outcome = outcome;
        self.next_page = next_page;
        self.pauses = pauses;
        self.time_paused = time_paused;
        self.finished_at = Utc::now();
        self
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// True once the whole listing has been written
    pub fn is_complete(&self) -> bool {
        self.next_page > PAGE_COUNT
    }

    /// Page to pass as the resume page, if the listing is unfinished
    pub fn resume_page(&self) -> Option<u32> {
        (!self.is_complete()).then_some(self.next_page)
    }
}

/// Formats a run summary for the terminal
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    let last_page = summary.next_page.saturating_sub(1);
    out.push_str(&format!(
        "Pages: {} (from page {} through page {})\n",
        summary.pages_completed, summary.start_page, last_page
    ));
    out.push_str(&format!("Records written: {}\n", summary.records_written));
    if summary.records_enriched > 0 || summary.enrichment_failures > 0 {
        out.push_str(&format!(
            "Enriched from detail pages: {} ({} kept catalog credits)\n",
            summary.records_enriched, summary.enrichment_failures
        ));
    }
    if summary.extraction_failures > 0 {
        out.push_str(&format!(
            "Skipped malformed entries: {}\n",
            summary.extraction_failures
        ));
    }
    out.push_str(&format!(
        "Pauses: {} ({} seconds)\n",
        summary.pauses,
        summary.time_paused.as_secs()
    ));
    out.push_str(&format!(
        "Duration: {} seconds ({:.2} minutes)\n",
        summary.duration_seconds(),
        summary.duration_seconds() as f64 / 60.0
    ));

    match (summary.outcome, summary.resume_page()) {
        (_, None) => out.push_str("Status: complete\n"),
        (RunOutcome::Cancelled, Some(page)) => out.push_str(&format!(
            "Status: cancelled, continue with --resume {}\n",
            page
        )),
        (RunOutcome::Completed, Some(page)) => out.push_str(&format!(
            "Status: incomplete, continue with --resume {}\n",
            page
        )),
    }

    out
}
