//! Crawler coordinator - recursive crawl orchestration
//!
//! Every discovered link becomes its own task. A task:
//! 1. Stops if it is deeper than the maximum depth
//! 2. Resolves its link against the crawl scope
//! 3. Claims the resource path in the dedup registry
//! 4. Reads the page from the local store, or fetches and persists it
//! 5. Extracts links from HTML content and spawns one child task per link
//!
//! All tasks of one crawl belong to a single [`TaskGroup`]: the first error
//! anywhere in the tree cancels the rest and becomes the crawl's result.

use crate::config::Config;
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::group::TaskGroup;
use crate::crawler::parser::{extract_links_from_bytes, looks_like_html};
use crate::output::{CrawlStats, CrawlSummary};
use crate::state::{ContentSource, DedupRegistry, SkipReason, TaskOutcome};
use crate::storage::{CachedRead, FsStore, LocalStore, PersistOutcome};
use crate::url::{LinkDecision, ResourcePath, ScopeContext};
use crate::{ConfigError, MirrorError};
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

type TaskFuture = Pin<Box<dyn Future<Output = Result<(), MirrorError>> + Send + 'static>>;

/// A link to process at a given depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// The link as found in the parent page (or the seed URL)
    pub url: String,

    /// Distance from the seed, which is depth 0
    pub depth: u32,
}

/// Mirrors websites into a local store
///
/// A `Crawler` can run several crawls; each call to [`Crawler::crawl`] gets its
/// own scope, dedup registry and task group.
pub struct Crawler {
    store: Arc<dyn LocalStore>,
    fetcher: Fetcher,
    fetch_permits: Option<Arc<Semaphore>>,
}

impl Crawler {
    pub fn new(store: Arc<dyn LocalStore>, fetcher: Fetcher) -> Self {
        Self {
            store,
            fetcher,
            fetch_permits: None,
        }
    }

    /// Builds a crawler writing to the configured output directory
    pub fn from_config(config: &Config) -> Result<Self, MirrorError> {
        let store = FsStore::new(config.output.directory.clone());
        tracing::debug!("Mirroring into {}", store.root().display());
        let store = Arc::new(store);
        let fetcher = Fetcher::with_timeout(config.crawler.request_timeout())?;

        Ok(Self::new(store, fetcher).with_fetch_limit(config.crawler.max_concurrent_fetches))
    }

    /// Limits the number of fetches in flight; 0 removes the limit
    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_permits = (limit > 0).then(|| Arc::new(Semaphore::new(limit)));
        self
    }

    /// Mirrors everything reachable from `seed` within `max_depth` links
    ///
    /// Returns the first error raised anywhere in the task tree. Cancelling
    /// `token` winds the crawl down; if no task failed before that, the result
    /// is [`MirrorError::Cancelled`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ripple_mirror::crawler::{Crawler, Fetcher};
    /// use ripple_mirror::storage::FsStore;
    /// use std::sync::Arc;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn example() -> ripple_mirror::Result<()> {
    /// let fetcher = Fetcher::with_timeout(None)?;
    /// let crawler = Crawler::new(Arc::new(FsStore::new("mirror")), fetcher);
    /// let summary = crawler
    ///     .crawl(&CancellationToken::new(), "https://example.com/docs/", 2)
    ///     .await?;
    /// println!("{}", summary);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(
        &self,
        token: &CancellationToken,
        seed: &str,
        max_depth: u32,
    ) -> Result<CrawlSummary, MirrorError> {
        let scope = ScopeContext::from_seed(seed).map_err(ConfigError::Seed)?;
        let started_at = Utc::now();

        tracing::info!(
            "Starting crawl of {} (scope {}{}, max depth {})",
            scope.seed(),
            scope.authority(),
            scope.base_path(),
            max_depth
        );

        let group = TaskGroup::new(token);
        let run = Arc::new(CrawlRun {
            scope,
            max_depth,
            registry: DedupRegistry::new(),
            stats: CrawlStats::new(),
            store: Arc::clone(&self.store),
            fetcher: self.fetcher.clone(),
            fetch_permits: self.fetch_permits.clone(),
            group: group.clone(),
        });

        run.spawn(CrawlTask {
            url: seed.to_string(),
            depth: 0,
        });

        if let Some(err) = group.wait().await {
            return Err(err);
        }
        if token.is_cancelled() {
            return Err(MirrorError::Cancelled);
        }

        let summary = run.stats.summarize(seed, started_at, Utc::now());
        tracing::info!(
            "Crawl completed: {} pages processed, {} resources claimed",
            summary.pages_processed(),
            run.registry.claimed_count()
        );
        Ok(summary)
    }
}

/// Everything the tasks of one crawl share
struct CrawlRun {
    scope: ScopeContext,
    max_depth: u32,
    registry: DedupRegistry,
    stats: CrawlStats,
    store: Arc<dyn LocalStore>,
    fetcher: Fetcher,
    fetch_permits: Option<Arc<Semaphore>>,
    group: TaskGroup,
}

/// Content of a claimed resource, wherever it came from
struct LoadedPage {
    path: ResourcePath,
    bytes: Vec<u8>,
    is_html: bool,
    source: ContentSource,
}

/// Result of looking a claimed resource up in the local store
enum Lookup {
    Hit(LoadedPage),
    Collision,
    /// The cached file belongs to another task's claim
    Claimed,
    Miss,
}

impl CrawlRun {
    /// Spawns a task into the crawl's group
    fn spawn(self: &Arc<Self>, task: CrawlTask) {
        self.group.spawn(run_task(Arc::clone(self), task));
    }

    fn token(&self) -> &CancellationToken {
        self.group.token()
    }

    /// Runs one task to its terminal state
    async fn process(self: &Arc<Self>, task: &CrawlTask) -> Result<TaskOutcome, MirrorError> {
        if task.depth > self.max_depth {
            return Ok(TaskOutcome::Skipped(SkipReason::DepthExceeded));
        }
        if self.token().is_cancelled() {
            return Ok(TaskOutcome::Skipped(SkipReason::Cancelled));
        }

        let url = match self.scope.resolve(&task.url)? {
            LinkDecision::InScope(url) => url,
            LinkDecision::OutOfScope => return Ok(TaskOutcome::Skipped(SkipReason::OutOfScope)),
            LinkDecision::Unsupported => {
                return Ok(TaskOutcome::Skipped(SkipReason::UnsupportedLink))
            }
        };

        let Some(path) = ResourcePath::from_url(&url) else {
            return Ok(TaskOutcome::Skipped(SkipReason::UnsupportedLink));
        };

        if !self.registry.claim(&path) {
            return Ok(TaskOutcome::Skipped(SkipReason::AlreadyClaimed));
        }

        let page = match self.read_cached(&path).await? {
            Lookup::Hit(page) => page,
            Lookup::Collision => return Ok(TaskOutcome::Skipped(SkipReason::PathCollision)),
            Lookup::Claimed => return Ok(TaskOutcome::Skipped(SkipReason::AlreadyClaimed)),
            Lookup::Miss => match self.download(&url, &path).await? {
                Ok(page) => page,
                Err(reason) => return Ok(TaskOutcome::Skipped(reason)),
            },
        };

        tracing::info!(url = %url, path = %page.path, source = %page.source, "Mirrored page");

        let children = if page.is_html {
            self.spawn_children(&page, task.depth + 1)
        } else {
            0
        };

        Ok(TaskOutcome::Done {
            source: page.source,
            children,
        })
    }

    /// Looks the resource up in the local store
    ///
    /// HTML pages are stored with an `.html` suffix, so a miss on a path
    /// without one also tries the suffixed variant. A hit on that variant
    /// claims it as well, so the file is processed by one task only.
    async fn read_cached(&self, path: &ResourcePath) -> Result<Lookup, MirrorError> {
        let mut candidates = vec![path.clone()];
        if !path.has_html_suffix() {
            candidates.push(path.with_html_suffix());
        }

        for candidate in candidates {
            match self.store.read_cached(&candidate).await? {
                CachedRead::Hit(bytes) => {
                    if candidate != *path && !self.registry.claim(&candidate) {
                        return Ok(Lookup::Claimed);
                    }
                    let is_html = candidate.has_html_suffix() || looks_like_html(&bytes);
                    return Ok(Lookup::Hit(LoadedPage {
                        path: candidate,
                        bytes,
                        is_html,
                        source: ContentSource::Cache,
                    }));
                }
                CachedRead::Collision => {
                    tracing::debug!("{} collides with an existing path", candidate);
                    return Ok(Lookup::Collision);
                }
                CachedRead::NotFound => {}
            }
        }

        Ok(Lookup::Miss)
    }

    /// Fetches the resource and persists it
    ///
    /// HTML content is stored under its `.html` path. That path is claimed
    /// too, so two links never write the same file.
    async fn download(
        &self,
        url: &Url,
        path: &ResourcePath,
    ) -> Result<Result<LoadedPage, SkipReason>, MirrorError> {
        let page = self.fetch(url).await?;
        let is_html = page.is_html();
        let target = if is_html { path.for_html() } else { path.clone() };

        if target != *path && !self.registry.claim(&target) {
            return Ok(Err(SkipReason::AlreadyClaimed));
        }

        match self.store.persist(&target, &page.body).await? {
            PersistOutcome::Stored => {}
            PersistOutcome::Collision => {
                tracing::debug!("Not storing {}: {} collides with an existing path", url, target);
                return Ok(Err(SkipReason::PathCollision));
            }
        }

        self.stats.add_bytes(page.body.len());

        Ok(Ok(LoadedPage {
            path: target,
            bytes: page.body,
            is_html,
            source: ContentSource::Download,
        }))
    }

    /// Issues the GET request, waiting for a fetch permit when limited
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, MirrorError> {
        let _permit = match &self.fetch_permits {
            Some(permits) => tokio::select! {
                biased;
                _ = self.token().cancelled() => return Err(MirrorError::Cancelled),
                permit = permits.acquire() => Some(permit.map_err(|_| MirrorError::Cancelled)?),
            },
            None => None,
        };

        self.fetcher.fetch(self.token(), url).await
    }

    /// Extracts links from a page and spawns a task for each
    fn spawn_children(self: &Arc<Self>, page: &LoadedPage, depth: u32) -> usize {
        let links = extract_links_from_bytes(&page.bytes);
        self.stats.add_links(links.len());

        if self.token().is_cancelled() {
            return 0;
        }

        let count = links.len();
        for url in links {
            self.spawn(CrawlTask { url, depth });
        }
        count
    }
}

/// Boxed so a task can spawn tasks of its own type
fn run_task(run: Arc<CrawlRun>, task: CrawlTask) -> TaskFuture {
    Box::pin(async move {
        let outcome = run
            .process(&task)
            .await
            .map_err(|e| e.in_task(&task.url, task.depth))?;

        match outcome {
            TaskOutcome::Done { children, .. } => {
                tracing::debug!("{} at depth {} spawned {} tasks", task.url, task.depth, children);
            }
            TaskOutcome::Skipped(reason) => {
                tracing::debug!("Skipping {} at depth {}: {}", task.url, task.depth, reason);
            }
        }
        run.stats.record(&outcome);
        Ok(())
    })
}
