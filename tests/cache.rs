//! Assignment cache integration tests.

mod common;

use std::sync::Arc;

use micro_match::{
    AssignmentStore, CorrespondenceConfig, DiskStore, FilterConfig, Matcher, MeshLibrary, PairKey,
};
use tempfile::TempDir;

use common::{ellipsoid, init_logging};

fn matcher(store: Arc<DiskStore>) -> Matcher {
    let library = MeshLibrary::new()
        .with(ellipsoid("Q01", 60, [1.0, 1.5, 0.8]))
        .with(ellipsoid("Q02", 50, [1.1, 1.4, 0.8]));
    let config = CorrespondenceConfig::new(12, false, FilterConfig::optimal(2, 0.1));
    Matcher::new(Arc::new(library), config)
        .unwrap()
        .with_store(store)
}

#[test]
fn test_second_match_is_cached() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let store = Arc::new(DiskStore::new(dir.path()).unwrap());
    let matcher = matcher(store.clone());

    let first = matcher.match_pair("Q01", "Q02").unwrap();
    assert!(!first.from_cache);
    assert!(dir.path().join("Q02_Q01.npy").exists());

    let second = matcher.match_pair("Q02", "Q01").unwrap();
    assert!(second.from_cache);
    assert_eq!(second.assignment, first.assignment);
    assert_eq!(second.distortion, first.distortion);

    // A fresh store over the same directory sees the entry
    let reopened = DiskStore::new(dir.path()).unwrap();
    let stored = reopened.load(&PairKey::new("Q02", "Q01")).unwrap();
    assert_eq!(stored, Some(first.assignment));
}

#[test]
fn test_corrupt_entry_is_recomputed() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let store = Arc::new(DiskStore::new(dir.path()).unwrap());
    let key = PairKey::new("Q02", "Q01");
    std::fs::write(store.path(&key), b"not an array").unwrap();

    let outcome = matcher(store.clone()).match_pair("Q01", "Q02").unwrap();
    assert!(!outcome.from_cache);
    assert_eq!(store.load(&key).unwrap(), Some(outcome.assignment));
}

#[test]
fn test_oversized_entry_is_recomputed() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(DiskStore::new(dir.path()).unwrap());
    let key = PairKey::new("Q02", "Q01");

    // Header claims far more elements than memory could hold
    let dict = "{'descr': '<i8', 'fortran_order': False, 'shape': (2, 2305843009213693952), }";
    let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
    bytes.extend_from_slice(&(dict.len() as u16 + 1).to_le_bytes());
    bytes.extend_from_slice(dict.as_bytes());
    bytes.push(b'\n');
    std::fs::write(store.path(&key), &bytes).unwrap();

    let outcome = matcher(store.clone()).match_pair("Q01", "Q02").unwrap();
    assert!(!outcome.from_cache);
    assert_eq!(store.load(&key).unwrap(), Some(outcome.assignment));
}

#[test]
fn test_missing_directory_is_created() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("cache").join("assignments");
    let store = DiskStore::new(&nested).unwrap();
    assert!(nested.is_dir());
    assert_eq!(store.load(&PairKey::new("a", "b")).unwrap(), None);
}
