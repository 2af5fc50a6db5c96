use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MAX_DEPTH: u32 = 3;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Main configuration structure for Ripple-Mirror
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum recursion depth from the seed URL (the seed is depth 0)
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Timeout for an individual request in seconds, 0 disables it
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Maximum number of fetches in flight, 0 leaves the fan-out unbounded
    #[serde(rename = "max-concurrent-fetches", default)]
    pub max_concurrent_fetches: usize,
}

impl CrawlerConfig {
    /// Per-request timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout > 0).then(|| Duration::from_secs(self.request_timeout))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_concurrent_fetches: 0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory under which `<host>/<path>` trees are written
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

/// Values supplied on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_depth: Option<u32>,
    pub request_timeout: Option<u64>,
    pub max_concurrent_fetches: Option<usize>,
    pub output_directory: Option<PathBuf>,
}

impl Config {
    /// Applies command-line overrides on top of this configuration
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(depth) = overrides.max_depth {
            self.crawler.max_depth = depth;
        }
        if let Some(timeout) = overrides.request_timeout {
            self.crawler.request_timeout = timeout;
        }
        if let Some(limit) = overrides.max_concurrent_fetches {
            self.crawler.max_concurrent_fetches = limit;
        }
        if let Some(directory) = overrides.output_directory {
            self.output.directory = directory;
        }
        self
    }
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}
