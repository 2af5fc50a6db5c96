//! Terminal outcomes of a crawl task
//!
//! A task moves through scope check, claim, cache read or download, parse and
//! child spawning. It ends `Done`, `Skipped` or failed (an `Err`).

use std::fmt;

/// Where the content of a processed page came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentSource {
    /// Read from a file already present in the mirror
    Cache,
    /// Fetched over the network and persisted
    Download,
}

/// Why a task stopped without doing any work
///
/// None of these are errors; they never affect sibling tasks or the crawl
/// outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Task depth is beyond the configured maximum
    DepthExceeded,
    /// Link points at another host or outside the seed path
    OutOfScope,
    /// Relative link form that is not followed
    UnsupportedLink,
    /// Another task already claimed the resource
    AlreadyClaimed,
    /// Name used as both a file and a directory in the mirror
    PathCollision,
    /// The crawl was cancelled before the task did any work
    Cancelled,
}

/// Terminal state of a task that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The page was processed and `children` tasks were spawned from it
    Done {
        source: ContentSource,
        children: usize,
    },
    Skipped(SkipReason),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DepthExceeded => "depth exceeded",
            Self::OutOfScope => "out of scope",
            Self::UnsupportedLink => "unsupported link",
            Self::AlreadyClaimed => "already claimed",
            Self::PathCollision => "path collision",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Download => write!(f, "download"),
        }
    }
}
