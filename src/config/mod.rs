//! Configuration module for Ripple-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and merging command-line overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use ripple_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirror will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, Overrides};

// Re-export parser functions
pub use parser::{load_config, load_config_with_hash};
pub use validation::validate;
