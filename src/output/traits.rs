//! Record sink traits and types
//!
//! This module defines the trait interface for record sinks and the
//! associated error type.

use crate::record::MovieRecord;
use thiserror::Error;

/// Errors that can occur while persisting records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// How the output file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    /// Truncate and write the header row first
    Overwrite,

    /// Keep existing rows and write no header
    Append,
}

impl SinkMode {
    /// Page 1 starts a fresh file; any later page continues an earlier run
    pub fn for_resume_page(resume_page: u32) -> Self {
        if resume_page <= 1 {
            Self::Overwrite
        } else {
            Self::Append
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Append => "append",
        }
    }
}

/// Trait for record sinks
///
/// A failed write is fatal to the run; sinks do not buffer or retry.
pub trait RecordSink: Send {
    /// Persists one record, fields in header order
    fn write(&mut self, record: &MovieRecord) -> SinkResult<()>;

    /// Number of records written through this sink
    fn rows_written(&self) -> u64;
}

/// Collects records in memory
impl RecordSink for Vec<MovieRecord> {
    fn write(&mut self, record: &MovieRecord) -> SinkResult<()> {
        self.push(record.clone());
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.len() as u64
    }
}
