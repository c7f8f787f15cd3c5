//! Pipeline driver - main crawl orchestration logic
//!
//! The driver walks catalog pages from the resume page through the last page,
//! strictly one request at a time:
//!
//! 1. Fetch the catalog page (fatal on failure)
//! 2. Extract its entries in listing order
//! 3. Enrich each entry from its detail page unless in fast mode
//! 4. Write each record (fatal on failure)
//! 5. Pause before the next page
//!
//! Cancellation is honored only between pages, so the output always ends on a
//! page boundary that the next run can resume from.

use crate::config::{validate, Config};
use crate::crawler::enricher::DetailEnricher;
use crate::crawler::fetcher::{build_http_client, fetch_with_retry, RetryPolicy};
use crate::crawler::parser::{CatalogPage, ItemExtractor};
use crate::crawler::throttle::RateLimiter;
use crate::output::{
    CsvSink, ProgressEvent, ProgressObserver, RecordSink, RunOutcome, RunSummary, SinkMode,
};
use crate::state::{PipelineState, PAGE_SIZE};
use crate::url::catalog_page_url;
use crate::{ConfigError, Top250Error};
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Sequences fetch, extract, enrich and write for one run
pub struct Pipeline {
    config: Config,
    client: Client,
    extractor: ItemExtractor,
    enricher: DetailEnricher,
    limiter: RateLimiter,
    retry: RetryPolicy,
    sink: Box<dyn RecordSink>,
    observer: Arc<dyn ProgressObserver>,
    cancel: CancellationToken,
    state: PipelineState,
    base_url: Url,
}

impl Pipeline {
    /// Creates a pipeline writing to the configured CSV file
    ///
    /// A resume page of 1 truncates the file and writes the header; any later
    /// page appends to it.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `observer` - Receives progress events
    ///
    /// # Returns
    ///
    /// * `Ok(Pipeline)` - Ready to run
    /// * `Err(Top250Error)` - Invalid config, or the output could not be opened
    pub fn new(config: Config, observer: Arc<dyn ProgressObserver>) -> Result<Self, Top250Error> {
        validate(&config)?;

        let mode = SinkMode::for_resume_page(config.crawler.resume_page);
        let sink = CsvSink::open(Path::new(&config.output.csv_path), mode, config.output.header)?;

        Self::with_sink(config, Box::new(sink), observer)
    }

    /// Creates a pipeline writing to an arbitrary sink
    pub fn with_sink(
        config: Config,
        sink: Box<dyn RecordSink>,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<Self, Top250Error> {
        validate(&config)?;

        let state = PipelineState::new(config.crawler.resume_page)?;
        let base_url = Url::parse(&config.crawler.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.crawler.base_url, e)))?;
        let client = build_http_client(&config.user_agent, &config.crawler)?;

        Ok(Self {
            extractor: ItemExtractor::new()?,
            enricher: DetailEnricher::new()?,
            limiter: RateLimiter::from_config(&config.crawler),
            retry: RetryPolicy::from_config(&config.crawler),
            client,
            sink,
            observer,
            cancel: CancellationToken::new(),
            state,
            base_url,
            config,
        })
    }

    /// Replaces the cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run at the next page boundary
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the page loop to completion or cancellation
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Every page was processed, or the run was cancelled
    ///   at a page boundary
    /// * `Err(Top250Error)` - A catalog page could not be fetched or a record
    ///   could not be written; rows before the failure stay on disk
    pub async fn run(mut self) -> Result<RunSummary, Top250Error> {
        let mut summary = RunSummary::begin(self.state.start_page());

        self.emit(ProgressEvent::RunStarted {
            start_page: self.state.start_page(),
            pages: self.state.remaining_pages(),
            mode: SinkMode::for_resume_page(self.state.start_page()),
            output: self.config.output.csv_path.clone(),
            fast_mode: self.config.crawler.fast_mode,
        });

        while let Some(page) = self.state.current_page() {
            if self.cancel.is_cancelled() {
                let next_page = self.state.next_page();
                self.emit(ProgressEvent::RunCancelled { next_page });
                let summary = summary.finish(
                    RunOutcome::Cancelled,
                    next_page,
                    self.limiter.pauses_taken(),
                    self.limiter.total_paused(),
                );
                self.emit(ProgressEvent::RunFinished {
                    summary: summary.clone(),
                });
                return Ok(summary);
            }

            if let Err(e) = self.process_page(page, &mut summary).await {
                self.emit(ProgressEvent::RunAborted {
                    page,
                    reason: e.to_string(),
                });
                return Err(e);
            }

            self.emit(ProgressEvent::Paused {
                page,
                duration: self.limiter.interval(),
            });
            if !self.limiter.pause_or_cancel(&self.cancel).await {
                tracing::debug!("Pause after page {} cut short by cancellation", page);
            }

            self.state.advance();
            summary.pages_completed = self.state.pages_completed();
        }

        let summary = summary.finish(
            RunOutcome::Completed,
            self.state.next_page(),
            self.limiter.pauses_taken(),
            self.limiter.total_paused(),
        );
        self.emit(ProgressEvent::RunFinished {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Fetches one catalog page and writes its records
    async fn process_page(
        &mut self,
        page: u32,
        summary: &mut RunSummary,
    ) -> Result<(), Top250Error> {
        let url = catalog_page_url(&self.base_url, page);
        self.emit(ProgressEvent::PageStarted {
            page,
            url: url.to_string(),
        });

        let markup = fetch_with_retry(
            &self.client,
            url.as_str(),
            self.retry,
            &mut self.limiter,
            &self.cancel,
        )
        .await
        .map_err(|source| Top250Error::PageFetch { page, source })?;

        let catalog = CatalogPage::parse(url, &markup);

        let first_rank = (page - 1) * PAGE_SIZE + 1;
        let mut written = 0;

        for (index, result) in self.extractor.extract(catalog.document()).enumerate() {
            let rank = first_rank + index as u32;

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    summary.extraction_failures += 1;
                    self.emit(ProgressEvent::ItemSkipped {
                        page,
                        rank,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let mut enriched = false;
            let record = if self.config.crawler.fast_mode {
                record
            } else {
                match self
                    .enricher
                    .enrich(&self.client, &record.link, &catalog.url, &mut self.limiter)
                    .await
                {
                    Ok(credits) => {
                        enriched = true;
                        summary.records_enriched += 1;
                        record.with_credits(credits)
                    }
                    Err(e) => {
                        summary.enrichment_failures += 1;
                        self.emit(ProgressEvent::EnrichmentFailed {
                            page,
                            title: record.title.clone(),
                            reason: e.to_string(),
                        });
                        record
                    }
                }
            };

            self.sink
                .write(&record)
                .map_err(|source| Top250Error::Sink { page, source })?;
            written += 1;
            summary.records_written += 1;

            self.emit(ProgressEvent::RecordWritten {
                page,
                rank,
                title: record.title,
                enriched,
            });
        }

        self.emit(ProgressEvent::PageFinished {
            page,
            records: written,
        });
        Ok(())
    }

    fn emit(&self, event: ProgressEvent) {
        self.observer.on_event(&event);
    }
}

/// Runs a complete crawl, writing to the configured CSV file
///
/// # Example
///
/// ```no_run
/// use douban_top250::config::Config;
/// use douban_top250::crawler::run_pipeline;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.crawler.fast_mode = true;
/// let summary = run_pipeline(config).await?;
/// println!("{} records", summary.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_pipeline(config: Config) -> Result<RunSummary, Top250Error> {
    let observer: Arc<dyn ProgressObserver> = Arc::new(crate::output::NullProgress);
    Pipeline::new(config, observer)?.run().await
}
