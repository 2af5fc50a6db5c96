//! Ripple-Mirror: a concurrent website mirror
//!
//! This crate mirrors a website to local storage. Starting from a seed URL it
//! fetches a page, extracts hyperlinks and recursively fetches the in-scope
//! ones up to a bounded depth, skipping resources already claimed by another
//! task or already present on disk.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Ripple-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("can't resolve link: {0}")]
    Url(#[from] UrlError),

    #[error("can't fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("can't build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("local store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("can't process {url} at depth {depth}: {source}")]
    Task {
        url: String,
        depth: u32,
        #[source]
        source: Box<MirrorError>,
    },

    #[error("crawl cancelled")]
    Cancelled,
}

impl MirrorError {
    /// Wraps an error with the page whose processing produced it
    pub fn in_task(self, url: &str, depth: u32) -> Self {
        Self::Task {
            url: url.to_string(),
            depth,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping task wrappers
    pub fn root_cause(&self) -> &MirrorError {
        match self {
            Self::Task { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns true if this error (or the error it wraps) is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root_cause(), Self::Cancelled)
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid seed URL: {0}")]
    Seed(#[source] UrlError),

    #[error("invalid output directory: {}", .0.display())]
    OutputDirectory(PathBuf),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL cannot be empty")]
    Empty,

    #[error("incorrect URL {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: ::url::ParseError,
    },

    #[error("URL should start with http:// or https://, got {0}")]
    NotAbsolute(String),

    #[error("unsupported URL scheme in {0}")]
    InvalidScheme(String),

    #[error("missing host in URL {0}")]
    MissingHost(String),
}

/// Result type alias for Ripple-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Crawler};
pub use output::CrawlSummary;
pub use state::{DedupRegistry, SkipReason, TaskOutcome};
pub use storage::{FsStore, LocalStore, MemoryStore};
pub use url::{ResourcePath, ScopeContext};
