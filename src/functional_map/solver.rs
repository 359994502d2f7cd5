//! Functional map solver.
//!
//! # Formulation
//!
//! Descriptors are projected onto the first `k` basis functions:
//!
//! ```text
//! A = Φs⁺ Fs   (k × d)        B = Φd⁺ Fd   (k × d)
//! ```
//!
//! Each row `c_r` of `C` then solves an independent regularized least
//! squares problem (Laplacian commutativity):
//!
//! ```text
//! min ‖c_r A − B_r‖² + μ Σ_j c_rj² (λs_j − λd_r)²
//! ```
//!
//! Eigenvalues are rescaled by the largest of the `2k` values so `μ` does not
//! depend on mesh scale.

use nalgebra::{DMatrix, DVector};

use super::symmetry::{ReflectionPlane, reflection_permutation};
use super::truncated_basis;
use crate::config::CorrespondenceConfig;
use crate::core::linalg::{least_squares, select_rows};
use crate::error::NumericalError;
use crate::mesh::MeshMetric;

/// Solved functional map.
#[derive(Clone, Debug)]
pub struct FunctionalMap {
    /// `k × k` map from source to destination coefficients
    pub c: DMatrix<f64>,
    /// Whether the reflected candidate won
    pub reflected: bool,
    /// Regularized residual of the returned map
    pub residual: f64,
}

impl FunctionalMap {
    /// Dimension `k`.
    pub fn dimension(&self) -> usize {
        self.c.nrows()
    }
}

/// Solves for an initial `k × k` functional map.
#[derive(Clone, Debug)]
pub struct FunctionalMapSolver {
    dimension: usize,
    symmetry_optimisation: bool,
    commutativity_weight: f64,
    residual_tolerance: f64,
}

impl FunctionalMapSolver {
    /// Solver for dimension `k` with default regularization.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            symmetry_optimisation: false,
            commutativity_weight: 1e-3,
            residual_tolerance: 1e-9,
        }
    }

    /// Solver configured from a correspondence config.
    pub fn from_config(config: &CorrespondenceConfig) -> Self {
        Self {
            dimension: config.initial_solve_dimension,
            symmetry_optimisation: config.symmetry_optimisation,
            commutativity_weight: config.solver.commutativity_weight,
            residual_tolerance: config.solver.residual_tolerance,
        }
    }

    /// Enable or disable the reflected candidate.
    pub fn with_symmetry_optimisation(mut self, enabled: bool) -> Self {
        self.symmetry_optimisation = enabled;
        self
    }

    /// Set the commutativity weight `μ`.
    pub fn with_commutativity_weight(mut self, weight: f64) -> Self {
        self.commutativity_weight = weight;
        self
    }

    /// Requested dimension `k`.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Solve for `C` between two meshes.
    pub fn solve(
        &self,
        src: &dyn MeshMetric,
        dst: &dyn MeshMetric,
    ) -> Result<FunctionalMap, NumericalError> {
        let k = self.dimension;
        if k == 0 {
            return Err(NumericalError::DimensionMismatch {
                context: "functional map dimension",
                expected: 1,
                actual: 0,
            });
        }
        let phi_s = truncated_basis(src, k)?;
        let phi_d = truncated_basis(dst, k)?;

        let fs = src.descriptors();
        let fd = dst.descriptors();
        if fs.ncols() == 0 || fd.ncols() == 0 {
            return Err(NumericalError::EmptyDescriptors);
        }
        if fs.ncols() != fd.ncols() {
            return Err(NumericalError::DimensionMismatch {
                context: "descriptor count",
                expected: fs.ncols(),
                actual: fd.ncols(),
            });
        }

        let (lambda_s, lambda_d) = scaled_eigenvalues(src, dst, k);
        let a = least_squares(&phi_s, fs, "source descriptor projection")?;
        let b = least_squares(&phi_d, fd, "destination descriptor projection")?;
        let (c, residual) =
            solve_regularized(&a, &b, &lambda_s, &lambda_d, self.commutativity_weight)?;

        let direct = FunctionalMap {
            c,
            reflected: false,
            residual,
        };
        if !self.symmetry_optimisation {
            return Ok(direct);
        }

        let Some(plane) = ReflectionPlane::bilateral(src.positions()) else {
            return Ok(direct);
        };
        let permutation = reflection_permutation(src.positions(), &plane);
        let fs_reflected = select_rows(fs, &permutation);
        let a_reflected =
            least_squares(&phi_s, &fs_reflected, "reflected descriptor projection")?;
        let (c_reflected, residual_reflected) = solve_regularized(
            &a_reflected,
            &b,
            &lambda_s,
            &lambda_d,
            self.commutativity_weight,
        )?;

        log::debug!(
            "Symmetry candidates: direct residual {:.6e}, reflected {:.6e}",
            direct.residual,
            residual_reflected
        );

        // Exact ties keep the direct solution
        if residual_reflected < direct.residual - self.residual_tolerance {
            Ok(FunctionalMap {
                c: c_reflected,
                reflected: true,
                residual: residual_reflected,
            })
        } else {
            Ok(direct)
        }
    }
}

/// First `k` eigenvalues of both meshes, divided by their joint maximum.
fn scaled_eigenvalues(
    src: &dyn MeshMetric,
    dst: &dyn MeshMetric,
    k: usize,
) -> (DVector<f64>, DVector<f64>) {
    let lambda_s = src.eigenvalues().rows(0, k).clone_owned();
    let lambda_d = dst.eigenvalues().rows(0, k).clone_owned();
    let scale = lambda_s.amax().max(lambda_d.amax());
    if scale > 0.0 {
        (lambda_s / scale, lambda_d / scale)
    } else {
        (lambda_s, lambda_d)
    }
}

/// Row-wise closed-form solution and its regularized residual.
///
/// Row `r` stacks `Aᵀ` over `√μ · diag(|λs − λd_r|)` and solves against
/// `[B_rᵀ; 0]`, so rank deficiency is detected by the SVD.
fn solve_regularized(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    lambda_s: &DVector<f64>,
    lambda_d: &DVector<f64>,
    weight: f64,
) -> Result<(DMatrix<f64>, f64), NumericalError> {
    let k = a.nrows();
    let d = a.ncols();
    let at = a.transpose();
    let sqrt_weight = weight.sqrt();

    let mut c = DMatrix::zeros(k, k);
    for r in 0..k {
        let mut system = DMatrix::zeros(d + k, k);
        system.rows_mut(0, d).copy_from(&at);
        let mut rhs = DMatrix::zeros(d + k, 1);
        for j in 0..d {
            rhs[(j, 0)] = b[(r, j)];
        }
        for j in 0..k {
            system[(d + j, j)] = sqrt_weight * (lambda_s[j] - lambda_d[r]).abs();
        }
        let row = least_squares(&system, &rhs, "functional map")?;
        for j in 0..k {
            c[(r, j)] = row[(j, 0)];
        }
    }

    let fit = (&c * a - b).norm_squared();
    let mut penalty = 0.0;
    for r in 0..k {
        for j in 0..k {
            let diff = lambda_s[j] - lambda_d[r];
            penalty += c[(r, j)] * c[(r, j)] * diff * diff;
        }
    }
    Ok((c, fit + weight * penalty))
}
