//! Crawl statistics
//!
//! Counters are updated concurrently by every task, so they are plain
//! atomics; a [`CrawlSummary`] is a snapshot taken once the task tree has
//! finished.

use crate::state::{ContentSource, SkipReason, TaskOutcome};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by all tasks of one crawl
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_downloaded: AtomicU64,
    cache_hits: AtomicU64,
    bytes_downloaded: AtomicU64,
    links_discovered: AtomicU64,
    skipped_depth: AtomicU64,
    skipped_out_of_scope: AtomicU64,
    skipped_unsupported: AtomicU64,
    skipped_claimed: AtomicU64,
    skipped_collision: AtomicU64,
    skipped_cancelled: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the terminal outcome of a task
    pub fn record(&self, outcome: &TaskOutcome) {
        let counter = match outcome {
            TaskOutcome::Done {
                source: ContentSource::Download,
                ..
            } => &self.pages_downloaded,
            TaskOutcome::Done {
                source: ContentSource::Cache,
                ..
            } => &self.cache_hits,
            TaskOutcome::Skipped(reason) => match reason {
                SkipReason::DepthExceeded => &self.skipped_depth,
                SkipReason::OutOfScope => &self.skipped_out_of_scope,
                SkipReason::UnsupportedLink => &self.skipped_unsupported,
                SkipReason::AlreadyClaimed => &self.skipped_claimed,
                SkipReason::PathCollision => &self.skipped_collision,
                SkipReason::Cancelled => &self.skipped_cancelled,
            },
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes(&self, bytes: usize) {
        self.bytes_downloaded
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn add_links(&self, links: usize) {
        self.links_discovered
            .fetch_add(links as u64, Ordering::Relaxed);
    }

    /// Takes a snapshot of the counters
    pub fn summarize(
        &self,
        seed: &str,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> CrawlSummary {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        CrawlSummary {
            seed: seed.to_string(),
            started_at,
            finished_at,
            pages_downloaded: load(&self.pages_downloaded),
            cache_hits: load(&self.cache_hits),
            bytes_downloaded: load(&self.bytes_downloaded),
            links_discovered: load(&self.links_discovered),
            skipped_depth: load(&self.skipped_depth),
            skipped_out_of_scope: load(&self.skipped_out_of_scope),
            skipped_unsupported: load(&self.skipped_unsupported),
            skipped_claimed: load(&self.skipped_claimed),
            skipped_collision: load(&self.skipped_collision),
            skipped_cancelled: load(&self.skipped_cancelled),
        }
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// The seed URL the crawl started from
    pub seed: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Pages fetched over the network and persisted
    pub pages_downloaded: u64,

    /// Pages read back from the mirror without a fetch
    pub cache_hits: u64,

    pub bytes_downloaded: u64,

    /// Links extracted from all processed pages, before scope checks
    pub links_discovered: u64,

    pub skipped_depth: u64,
    pub skipped_out_of_scope: u64,
    pub skipped_unsupported: u64,
    pub skipped_claimed: u64,
    pub skipped_collision: u64,
    pub skipped_cancelled: u64,
}

impl CrawlSummary {
    /// Pages processed, downloaded or cached
    pub fn pages_processed(&self) -> u64 {
        self.pages_downloaded + self.cache_hits
    }

    /// Tasks that stopped without processing a page
    pub fn pages_skipped(&self) -> u64 {
        self.skipped_depth
            + self.skipped_out_of_scope
            + self.skipped_unsupported
            + self.skipped_claimed
            + self.skipped_collision
            + self.skipped_cancelled
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mirrored {} pages from {} ({} downloaded, {} from cache, {} bytes) in {:.2}s; {} links skipped",
            self.pages_processed(),
            self.seed,
            self.pages_downloaded,
            self.cache_hits,
            self.bytes_downloaded,
            self.duration().num_milliseconds() as f64 / 1000.0,
            self.pages_skipped()
        )
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("{}", summary);

    if summary.pages_skipped() > 0 {
        println!(
            "  Skipped: {} out of scope, {} unsupported, {} already claimed, {} beyond depth, {} path collisions, {} cancelled",
            summary.skipped_out_of_scope,
            summary.skipped_unsupported,
            summary.skipped_claimed,
            summary.skipped_depth,
            summary.skipped_collision,
            summary.skipped_cancelled
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let stats = CrawlStats::new();
        stats.record(&TaskOutcome::Done {
            source: ContentSource::Download,
            children: 2,
        });
        stats.record(&TaskOutcome::Done {
            source: ContentSource::Cache,
            children: 0,
        });
        stats.record(&TaskOutcome::Skipped(SkipReason::OutOfScope));
        stats.record(&TaskOutcome::Skipped(SkipReason::AlreadyClaimed));
        stats.record(&TaskOutcome::Skipped(SkipReason::AlreadyClaimed));
        stats.add_bytes(1024);
        stats.add_links(7);

        let now = Utc::now();
        let summary = stats.summarize("http://example.com/", now, now);

        assert_eq!(summary.pages_downloaded, 1);
        assert_eq!(summary.cache_hits, 1);
        assert_eq!(summary.pages_processed(), 2);
        assert_eq!(summary.skipped_out_of_scope, 1);
        assert_eq!(summary.skipped_claimed, 2);
        assert_eq!(summary.pages_skipped(), 3);
        assert_eq!(summary.bytes_downloaded, 1024);
        assert_eq!(summary.links_discovered, 7);
    }

    #[test]
    fn test_summary_display() {
        let stats = CrawlStats::new();
        stats.record(&TaskOutcome::Done {
            source: ContentSource::Download,
            children: 0,
        });
        let started = Utc::now();
        let finished = started + chrono::Duration::milliseconds(1500);
        let line = stats
            .summarize("http://example.com/docs/", started, finished)
            .to_string();

        assert!(line.starts_with("Mirrored 1 pages from http://example.com/docs/"));
        assert!(line.contains("in 1.50s"));
    }
}
