//! Crawler module for mirroring websites
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching bound to the crawl's cancellation token
//! - HTML link extraction
//! - The supervised task group that tracks the whole task tree
//! - The recursive crawl coordination

mod coordinator;
mod fetcher;
mod group;
mod parser;

pub use coordinator::{CrawlTask, Crawler};
pub use fetcher::{build_http_client, is_html_content_type, FetchedPage, Fetcher};
pub use group::TaskGroup;
pub use parser::{extract_links, extract_links_from_bytes, looks_like_html};

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::MirrorError;
use tokio_util::sync::CancellationToken;

/// Runs a complete mirror operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client with the configured request timeout
/// 2. Open the local store at the configured output directory
/// 3. Mirror everything reachable from `seed` within the configured depth
///
/// # Arguments
///
/// * `config` - The mirror configuration
/// * `token` - Cancelling it aborts in-flight fetches and ends the crawl
/// * `seed` - Absolute `http`/`https` URL to start from
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Every reachable page was processed
/// * `Err(MirrorError)` - The first error raised anywhere in the crawl
pub async fn crawl(
    config: &Config,
    token: &CancellationToken,
    seed: &str,
) -> Result<CrawlSummary, MirrorError> {
    Crawler::from_config(config)?
        .crawl(token, seed, config.crawler.max_depth)
        .await
}
