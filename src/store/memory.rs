//! In-memory assignment store.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::AssignmentStore;
use crate::core::{Assignment, PairKey};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<PairKey, Assignment>,
    writes: usize,
}

/// Store kept in a mutex-guarded map, mostly for tests.
///
/// Counts writes so tests can observe whether a match hit the cache.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry directly, without counting it as a write.
    pub fn insert(&self, key: PairKey, assignment: Assignment) {
        self.inner.lock().entries.insert(key, assignment);
    }

    /// Entry for `key`, if any.
    pub fn get(&self, key: &PairKey) -> Option<Assignment> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of [`save`](AssignmentStore::save) calls so far.
    pub fn writes(&self) -> usize {
        self.inner.lock().writes
    }
}

impl AssignmentStore for MemoryStore {
    fn load(&self, key: &PairKey) -> Result<Option<Assignment>, StoreError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &PairKey, assignment: &Assignment) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.entries.insert(key.clone(), assignment.clone());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_writes_only() {
        let store = MemoryStore::new();
        let key = PairKey::new("a", "b");
        store.insert(key.clone(), Assignment::identity(2));
        assert_eq!(store.writes(), 0);
        store.save(&key, &Assignment::identity(3)).unwrap();
        assert_eq!(store.writes(), 1);
        assert_eq!(store.load(&key).unwrap(), Some(Assignment::identity(3)));
        assert_eq!(store.len(), 1);
    }
}
