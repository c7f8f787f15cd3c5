//! State module for tracking crawl progress
//!
//! The pipeline has a single piece of long-lived state: the next catalog page to
//! process. It is not persisted; resuming relies on the caller passing the right
//! start page and on the output file already holding earlier pages' rows.
//!
//! # Components
//!
//! - `PipelineState`: the next page number and the run phase
//! - `RunPhase`: `Init -> PageLoop -> Done`

mod pipeline_state;

// Re-export main types
pub use pipeline_state::{page_offset, PipelineState, RunPhase, PAGE_COUNT, PAGE_SIZE};
