//! Functional maps between spectral coefficient spaces.
//!
//! ## Pipeline
//!
//! ```text
//!   descriptors Fs, Fd        spectral bases Φs, Φd
//!          │                          │
//!          ▼                          ▼
//!   ┌──────────────────┐     ┌──────────────────┐
//!   │  Solver (k × k)  │ ──▶ │     Zoomout      │  k → k+1 → … → k_max
//!   │ + reflected cand.│     │ pointwise ⇄ fit  │
//!   └──────────────────┘     └────────┬─────────┘
//!                                     ▼
//!                            ┌──────────────────┐
//!                            │ Soft correspond. │  P (N_src × N_dst)
//!                            └──────────────────┘
//! ```
//!
//! `C` maps source coefficients to destination coefficients: a function
//! with source coefficients `a` is transported to `C a`.

mod soft;
mod solver;
mod symmetry;
mod zoomout;

pub use soft::soft_correspondence;
pub use solver::{FunctionalMap, FunctionalMapSolver};
pub use symmetry::{ReflectionPlane, reflection_permutation};
pub use zoomout::{
    PointwiseMap, ZoomoutRefiner, ZoomoutResult, ZoomoutState, fit_functional_map, pointwise_map,
};

use nalgebra::DMatrix;

use crate::error::NumericalError;
use crate::mesh::MeshMetric;

/// First `k` basis functions of a mesh, or an error if fewer exist.
pub(crate) fn truncated_basis(
    mesh: &dyn MeshMetric,
    k: usize,
) -> Result<DMatrix<f64>, NumericalError> {
    let available = mesh.basis_size();
    if k > available {
        return Err(NumericalError::DimensionExceedsBasis {
            requested: k,
            available,
        });
    }
    Ok(mesh.basis().columns(0, k).clone_owned())
}
