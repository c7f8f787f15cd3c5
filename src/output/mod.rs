//! Output module for persisting records and reporting progress
//!
//! This module handles:
//! - Appending records to the CSV file
//! - Progress events for front ends
//! - Run statistics

mod csv_sink;
pub mod progress;
pub mod stats;
mod traits;

pub use csv_sink::{CsvSink, UTF8_BOM};
pub use progress::{log_event, NullProgress, ProgressEvent, ProgressObserver};
pub use stats::{format_summary, RunOutcome, RunSummary};
pub use traits::{RecordSink, SinkError, SinkMode, SinkResult};
