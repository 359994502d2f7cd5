//! In-memory mesh source.

use std::collections::HashMap;
use std::sync::Arc;

use super::{MeshMetric, MeshSource};
use crate::error::MeshError;

/// [`MeshSource`] backed by meshes already in memory, keyed by name.
#[derive(Clone, Default)]
pub struct MeshLibrary {
    meshes: HashMap<String, Arc<dyn MeshMetric>>,
}

impl MeshLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh under its own name, replacing any previous entry.
    pub fn insert<M: MeshMetric + 'static>(&mut self, mesh: M) {
        self.insert_shared(Arc::new(mesh));
    }

    /// Add a shared mesh under its own name.
    pub fn insert_shared(&mut self, mesh: Arc<dyn MeshMetric>) {
        self.meshes.insert(mesh.name().to_string(), mesh);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with<M: MeshMetric + 'static>(mut self, mesh: M) -> Self {
        self.insert(mesh);
        self
    }

    /// Sorted mesh names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.meshes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl MeshSource for MeshLibrary {
    fn load(&self, name: &str) -> Result<Arc<dyn MeshMetric>, MeshError> {
        self.meshes
            .get(name)
            .cloned()
            .ok_or_else(|| MeshError::NotFound(name.to_string()))
    }
}
