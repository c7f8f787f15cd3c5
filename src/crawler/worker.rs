//! Background execution for front ends that must stay responsive
//!
//! HTML documents are not `Send`, so the pipeline cannot hop between runtime
//! threads. The worker gives it a thread of its own with a current-thread
//! runtime and hands progress back over a channel.

use crate::config::Config;
use crate::crawler::coordinator::Pipeline;
use crate::output::{ProgressEvent, ProgressObserver, RunSummary};
use crate::Top250Error;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;

/// A pipeline running on its own thread
pub struct PipelineHandle {
    /// Progress events, closed when the run ends
    pub events: UnboundedReceiver<ProgressEvent>,

    cancel: CancellationToken,
    thread: JoinHandle<Result<RunSummary, Top250Error>>,
}

impl PipelineHandle {
    /// Asks the run to stop at the next page boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the run to end
    ///
    /// Blocks the calling thread; async callers should drain `events` until it
    /// closes first.
    pub fn join(self) -> Result<RunSummary, Top250Error> {
        self.thread
            .join()
            .map_err(|_| Top250Error::Worker("pipeline thread panicked".to_string()))?
    }
}

/// Starts a run on a background thread
///
/// Setup errors (invalid config, unopenable output) are reported through
/// [`PipelineHandle::join`] like any other run error.
///
/// # Example
///
/// ```no_run
/// use douban_top250::config::Config;
/// use douban_top250::crawler::spawn_pipeline;
/// use douban_top250::output::log_event;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut handle = spawn_pipeline(Config::default())?;
/// while let Some(event) = handle.events.recv().await {
///     log_event(&event);
/// }
/// let summary = handle.join()?;
/// # Ok(())
/// # }
/// ```
pub fn spawn_pipeline(config: Config) -> Result<PipelineHandle, Top250Error> {
    let (tx, events) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let thread = std::thread::Builder::new()
        .name("top250-pipeline".to_string())
        .spawn(move || -> Result<RunSummary, Top250Error> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;

            let observer: Arc<dyn ProgressObserver> = Arc::new(tx);
            let pipeline = Pipeline::new(config, observer)?.with_cancellation(token);
            runtime.block_on(pipeline.run())
        })?;

    Ok(PipelineHandle {
        events,
        cancel,
        thread,
    })
}
