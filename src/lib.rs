//! Douban Top250: a throttled, resumable catalog crawler
//!
//! This crate walks the ten pages of the Douban movie Top250 listing, extracts a
//! fixed ten-field record per entry, optionally visits each entry's detail page
//! for untruncated credits, and appends the results to a CSV file that can be
//! resumed from any page boundary.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum Top250Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch catalog page {page}: {source}")]
    PageFetch { page: u32, source: FetchError },

    #[error("Failed to write a record from page {page}: {source}")]
    Sink {
        page: u32,
        source: output::SinkError,
    },

    #[error("Failed to open output: {0}")]
    Output(#[from] output::SinkError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Extraction setup error: {0}")]
    Extract(#[from] ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline worker failed: {0}")]
    Worker(String),
}

impl Top250Error {
    /// The 1-based catalog page the run stopped on, if the error is tied to one
    pub fn failed_page(&self) -> Option<u32> {
        match self {
            Self::PageFetch { page, .. } | Self::Sink { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// How to continue after this error, if a resume page applies
    ///
    /// A failed fetch leaves the file on a page boundary. A failed write can
    /// leave part of the page on disk, and those rows must go before resuming.
    pub fn resume_hint(&self) -> Option<String> {
        match self {
            Self::PageFetch { page, .. } => Some(format!(
                "Stopped on page {}; continue with --resume {}",
                page, page
            )),
            Self::Sink { page, .. } => Some(format!(
                "Stopped part way through page {}; remove that page's rows from the \
                 end of the file, then continue with --resume {}",
                page, page
            )),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors from a single outbound request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("Request to {url} cancelled")]
    Cancelled { url: String },
}

/// Errors raised while extracting one catalog entry
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing field: {field}")]
    MissingField { field: &'static str },

    #[error("Malformed {field} line: {line:?}")]
    MalformedLine { field: &'static str, line: String },

    #[error("Invalid selector: {0}")]
    Selector(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, Top250Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_pipeline, spawn_pipeline, Pipeline, PipelineHandle};
pub use output::{RunOutcome, RunSummary};
pub use record::MovieRecord;
pub use state::PipelineState;
