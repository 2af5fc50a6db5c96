//! Shared crawl state
//!
//! This module contains the dedup registry that every task consults before
//! touching the network or the disk, and the terminal outcomes a task can
//! reach.

mod registry;
mod task_state;

pub use registry::DedupRegistry;
pub use task_state::{ContentSource, SkipReason, TaskOutcome};
