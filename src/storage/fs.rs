use crate::storage::traits::{
    is_collision, CachedRead, LocalStore, PersistOutcome, StoreError, StoreResult,
};
use crate::url::ResourcePath;
use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TEMP_PREFIX: &str = ".ripple_";

/// Local store backed by a directory on disk
///
/// Resources live at `<root>/<authority>/<dir>/<file>`. Temporary files are
/// created directly under `root` so the final rename stays on one filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a resource inside this store
    pub fn location(&self, path: &ResourcePath) -> PathBuf {
        self.root.join(path.to_path_buf())
    }
}

#[async_trait]
impl LocalStore for FsStore {
    async fn read_cached(&self, path: &ResourcePath) -> StoreResult<CachedRead> {
        let location = self.location(path);
        match tokio::fs::read(&location).await {
            Ok(bytes) => Ok(CachedRead::Hit(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(CachedRead::NotFound),
            // A name is used as both a file and a directory
            Err(e) if is_collision(&e) => Ok(CachedRead::Collision),
            Err(source) => Err(StoreError::Read {
                path: location,
                source,
            }),
        }
    }

    async fn persist(&self, path: &ResourcePath, bytes: &[u8]) -> StoreResult<PersistOutcome> {
        let root = self.root.clone();
        let target = self.location(path);
        let bytes = bytes.to_vec();

        tokio::task::spawn_blocking(move || persist_blocking(&root, &target, &bytes)).await?
    }
}

/// Writes to a temporary file, creates the parents, then renames into place
fn persist_blocking(root: &Path, target: &Path, bytes: &[u8]) -> StoreResult<PersistOutcome> {
    std::fs::create_dir_all(root).map_err(|source| StoreError::CreateDir {
        dir: root.to_path_buf(),
        source,
    })?;

    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(root)
        .map_err(|source| StoreError::TempFile {
            dir: root.to_path_buf(),
            source,
        })?;

    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|source| StoreError::Write {
            path: target.to_path_buf(),
            source,
        })?;

    if let Some(parent) = target.parent() {
        match std::fs::create_dir_all(parent) {
            Ok(()) => {}
            // A path component exists as a regular file
            Err(e) if is_collision(&e) || e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!("Parent of {} collides with a file", target.display());
                return Ok(PersistOutcome::Collision);
            }
            Err(source) => {
                return Err(StoreError::CreateDir {
                    dir: parent.to_path_buf(),
                    source,
                })
            }
        }
    }

    match temp.persist(target) {
        Ok(_) => Ok(PersistOutcome::Stored),
        Err(e) if is_collision(&e.error) => {
            tracing::debug!("{} is already a directory", target.display());
            Ok(PersistOutcome::Collision)
        }
        Err(e) => Err(StoreError::Rename {
            path: target.to_path_buf(),
            source: e.error,
        }),
    }
}
