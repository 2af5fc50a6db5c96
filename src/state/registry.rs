use crate::url::ResourcePath;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of resource identifiers claimed during one crawl
///
/// Claims are permanent: there is no way to release one, so a resource is
/// processed by at most one task for the lifetime of the registry. The lock
/// is held only for a single check-and-insert, never across I/O.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    claimed: Mutex<HashSet<ResourcePath>>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a resource for the calling task
    ///
    /// Returns `true` if the resource was not yet claimed and now belongs to
    /// the caller, `false` if another task got there first.
    pub fn claim(&self, path: &ResourcePath) -> bool {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if claimed.contains(path) {
            return false;
        }
        claimed.insert(path.clone())
    }

    /// Number of resources claimed so far
    pub fn claimed_count(&self) -> usize {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
