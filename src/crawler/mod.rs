//! Crawler module for catalog fetching and processing
//!
//! This module contains the core pipeline, including:
//! - HTTP fetching with optional retry
//! - Catalog entry extraction and detail page enrichment
//! - Fixed-interval rate limiting
//! - Page loop coordination, in the foreground or on a worker thread

mod coordinator;
mod enricher;
mod fetcher;
pub mod fields;
mod parser;
mod throttle;
mod worker;

pub use coordinator::{run_pipeline, Pipeline};
pub use enricher::{DetailEnricher, EnrichError};
pub use fetcher::{build_http_client, fetch_url, fetch_with_retry, RetryPolicy};
pub use parser::{CatalogPage, ItemExtractor, Items};
pub use throttle::RateLimiter;
pub use worker::{spawn_pipeline, PipelineHandle};
