use crate::storage::traits::{CachedRead, LocalStore, PersistOutcome, StoreResult};
use crate::url::ResourcePath;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Local store held in memory
///
/// Applies the same collision rules as [`FsStore`](crate::storage::FsStore):
/// a name cannot be both a stored file and the parent of another one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `(path, content)` pairs
    pub fn with_files<I, P, B>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<String>,
        B: Into<Vec<u8>>,
    {
        let files = files
            .into_iter()
            .map(|(path, bytes)| (path.into(), bytes.into()))
            .collect();
        Self {
            files: Mutex::new(files),
            writes: AtomicUsize::new(0),
        }
    }

    /// Returns the content stored at a path
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().get(path).cloned()
    }

    /// Sorted list of stored paths
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Number of successful `persist` calls
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns true if `path` cannot be a file given what is already stored
fn collides(files: &HashMap<String, Vec<u8>>, path: &str) -> bool {
    let dir_prefix = format!("{}/", path);
    let used_as_dir = files.keys().any(|key| key.starts_with(&dir_prefix));

    let ancestor_is_file = path
        .match_indices('/')
        .any(|(idx, _)| files.contains_key(&path[..idx]));

    used_as_dir || ancestor_is_file
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn read_cached(&self, path: &ResourcePath) -> StoreResult<CachedRead> {
        let files = self.lock();
        if let Some(bytes) = files.get(path.as_str()) {
            return Ok(CachedRead::Hit(bytes.clone()));
        }
        if collides(&files, path.as_str()) {
            return Ok(CachedRead::Collision);
        }
        Ok(CachedRead::NotFound)
    }

    async fn persist(&self, path: &ResourcePath, bytes: &[u8]) -> StoreResult<PersistOutcome> {
        let mut files = self.lock();
        if collides(&files, path.as_str()) {
            return Ok(PersistOutcome::Collision);
        }
        files.insert(path.as_str().to_string(), bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(PersistOutcome::Stored)
    }
}
