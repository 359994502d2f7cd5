//! Assignment cache keyed by canonical mesh pair.
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`DiskStore`] | one `.npy` file per pair, readable by NumPy |
//! | [`MemoryStore`] | mutex-guarded map |
//!
//! Stores only move bytes. Checking that a loaded entry fits the meshes it
//! is used with is up to the caller.

mod disk;
mod memory;
mod npy;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::core::{Assignment, PairKey};
use crate::error::StoreError;

/// Key-value store from canonical pair to assignment.
pub trait AssignmentStore: Send + Sync {
    /// Entry for `key`; `Ok(None)` when absent.
    fn load(&self, key: &PairKey) -> Result<Option<Assignment>, StoreError>;

    /// Insert or replace the entry for `key`.
    fn save(&self, key: &PairKey, assignment: &Assignment) -> Result<(), StoreError>;
}
