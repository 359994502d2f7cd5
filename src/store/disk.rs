//! File-backed assignment store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::npy::{read_npy, write_npy};
use super::AssignmentStore;
use crate::core::{Assignment, PairKey};
use crate::error::StoreError;

/// One `.npy` file per pair in a directory.
///
/// Files are written to a temporary file in the same directory and renamed
/// into place, so readers never see a partial entry. Two workers racing on
/// the same pair both compute and both write; the last rename wins.
#[derive(Clone, Debug)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the entry for `key`.
    pub fn path(&self, key: &PairKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl AssignmentStore for DiskStore {
    fn load(&self, key: &PairKey) -> Result<Option<Assignment>, StoreError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let mut file = fs::File::open(&path)?;
        read_npy(&mut file)
            .map(Some)
            .map_err(|reason| StoreError::Malformed {
                path: path.display().to_string(),
                reason,
            })
    }

    fn save(&self, key: &PairKey, assignment: &Assignment) -> Result<(), StoreError> {
        let mut file = NamedTempFile::new_in(&self.dir)?;
        write_npy(assignment, &mut file)?;
        file.flush()?;
        file.persist(self.path(key)).map_err(|e| e.error)?;
        log::debug!("Cached {} ({} pairs)", key, assignment.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = DiskStore::new(dir.path()).unwrap();
        let key = PairKey::new("Q02", "Q03");
        let assignment = Assignment::new(vec![0, 1, 4], vec![9, 3, 2]).unwrap();

        store.save(&key, &assignment).unwrap();
        assert!(dir.path().join("Q02_Q03.npy").exists());
        assert_eq!(store.load(&key).unwrap(), Some(assignment));
    }

    #[test]
    fn test_missing_entry() {
        let dir = TempDir::new().unwrap();
        let store = DiskStore::new(dir.path()).unwrap();
        assert_eq!(store.load(&PairKey::new("a", "b")).unwrap(), None);
    }

    #[test]
    fn test_malformed_entry() {
        let dir = TempDir::new().unwrap();
        let store = DiskStore::new(dir.path()).unwrap();
        let key = PairKey::new("a", "b");
        fs::write(store.path(&key), b"garbage").unwrap();
        assert!(matches!(
            store.load(&key),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn test_overwrite_keeps_last() {
        let dir = TempDir::new().unwrap();
        let store = DiskStore::new(dir.path().join("nested")).unwrap();
        let key = PairKey::new("a", "b");
        store.save(&key, &Assignment::identity(3)).unwrap();
        store.save(&key, &Assignment::identity(5)).unwrap();
        assert_eq!(store.load(&key).unwrap(), Some(Assignment::identity(5)));
        // No temporary files left behind
        assert_eq!(fs::read_dir(store.dir()).unwrap().count(), 1);
    }
}
