//! Output module for crawl statistics and the final summary
//!
//! This module handles:
//! - Counting what every task did while the crawl runs
//! - Producing the summary returned by a successful crawl
//! - Printing that summary as the final status line

pub mod stats;

pub use stats::{print_summary, CrawlStats, CrawlSummary};
