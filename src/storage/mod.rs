//! Local store for mirrored resources
//!
//! The mirror doubles as a cache: a resource already on disk is read back
//! instead of being downloaded again. This module handles:
//! - Reading cached resources and classifying collisions
//! - Atomic persistence (temporary file, parent directories, rename)
//! - An in-memory store with the same semantics for tests

mod fs;
mod memory;
mod traits;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use traits::{CachedRead, LocalStore, PersistOutcome, StoreError, StoreResult};
