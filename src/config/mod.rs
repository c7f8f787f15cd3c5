//! Configuration module for the Top250 crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a missing file is equivalent to an empty one.
//!
//! # Example
//!
//! ```no_run
//! use douban_top250::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("top250.toml")).unwrap();
//! println!("Pausing {}ms between requests", config.crawler.pause_millis);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, HeaderStyle, OutputConfig, UserAgentConfig, DEFAULT_BASE_URL,
    DEFAULT_CSV_PATH, DEFAULT_PAUSE_MILLIS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
