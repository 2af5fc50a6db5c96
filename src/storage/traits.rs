//! Storage traits and error types
//!
//! This module defines the trait interface for local store backends and
//! associated error types.

use crate::url::ResourcePath;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during local store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("can't read cached file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't create temporary file in {}: {source}", .dir.display())]
    TempFile {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't write temporary file for {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't create directory {}: {source}", .dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't rename temporary file to {}: {source}", .path.display())]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result of looking up a resource in the local store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedRead {
    /// The file exists and was read completely
    Hit(Vec<u8>),
    /// Nothing is stored at this path yet
    NotFound,
    /// The path is unusable because a name is both a file and a directory
    Collision,
}

/// Result of persisting a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The file is now complete at its path
    Stored,
    /// The path collides with an existing file or directory, nothing written
    Collision,
}

/// Trait for local store implementations
///
/// Implementations must be safe to share across tasks. `persist` must never
/// leave a partially written file visible at the target path.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Reads a previously mirrored resource
    async fn read_cached(&self, path: &ResourcePath) -> StoreResult<CachedRead>;

    /// Atomically stores `bytes` at `path`
    async fn persist(&self, path: &ResourcePath, bytes: &[u8]) -> StoreResult<PersistOutcome>;
}

/// Returns true if an I/O error means a name is used as both file and directory
pub(crate) fn is_collision(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::IsADirectory | io::ErrorKind::NotADirectory
    )
}
