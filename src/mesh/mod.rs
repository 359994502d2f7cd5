//! Mesh metric contract and a reference implementation.
//!
//! The correspondence pipeline only sees meshes through [`MeshMetric`]:
//! vertex positions, a geodesic distance matrix, a spectral basis with its
//! eigenvalues, per-vertex descriptors, and a decimation operator. Loading
//! meshes from files is left to the caller; [`SurfaceMesh`] builds all of the
//! above from vertices plus triangles (or a k-NN graph) so the pipeline can
//! run end to end.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`MeshMetric`] | Read-only per-mesh data consumed by the pipeline |
//! | [`MeshSource`] | Loads meshes by identifier |
//! | [`SurfaceMesh`] | Graph geodesics, Laplacian eigenbasis, heat kernel signatures |
//! | [`MeshLibrary`] | In-memory [`MeshSource`] |

mod geodesic;
mod library;
mod sampling;
mod spectral;
mod surface;

use std::sync::Arc;

use nalgebra::{DMatrix, DVector, Point3};

use crate::error::MeshError;

pub use geodesic::all_pairs_geodesics;
pub use library::MeshLibrary;
pub use sampling::farthest_point_sampling;
pub use spectral::{SpectralConfig, SpectralData};
pub use surface::SurfaceMesh;

/// Per-mesh data consumed by the correspondence pipeline.
///
/// Implementations are immutable for the duration of a match.
pub trait MeshMetric: Send + Sync {
    /// Mesh identifier
    fn name(&self) -> &str;

    /// Number of vertices `N`
    fn num_vertices(&self) -> usize;

    /// Vertex positions (length `N`)
    fn positions(&self) -> &[Point3<f64>];

    /// Geodesic distance matrix (`N × N`, symmetric, zero diagonal)
    fn geodesics(&self) -> &DMatrix<f64>;

    /// Laplacian eigenvalues in ascending order (length `K`)
    fn eigenvalues(&self) -> &DVector<f64>;

    /// Spectral basis, one eigenfunction per column (`N × K`)
    fn basis(&self) -> &DMatrix<f64>;

    /// Descriptor functions, one per column (`N × d`)
    fn descriptors(&self) -> &DMatrix<f64>;

    /// Representative vertex subset of about `N · fraction` indices.
    fn decimate(&self, fraction: f64) -> Result<Vec<usize>, MeshError>;

    /// Number of available basis functions `K`
    fn basis_size(&self) -> usize {
        self.basis().ncols()
    }
}

/// Loads meshes by identifier.
pub trait MeshSource: Send + Sync {
    /// Load the mesh with the given identifier.
    fn load(&self, name: &str) -> Result<Arc<dyn MeshMetric>, MeshError>;
}
