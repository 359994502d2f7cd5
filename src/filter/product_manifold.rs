//! Product manifold filter.
//!
//! Alternates between a masked assignment solve and rebuilding the affinity
//! from geodesic consistency with the current matches:
//!
//! ```text
//! K_x = exp(−g_src[:, i]² / σ²)     K_y = exp(−g_dst[:, j]² / σ²)
//! P'  = K_x K_yᵀ
//! ```
//!
//! A pair `(x, y)` scores high when `x` is close to matched source vertices
//! whose partners are close to `y`. `σ` shrinks from `sigma_start` to
//! `sigma_end` (relative to the larger geodesic diameter) over the iteration
//! budget, so early iterations favour global consistency and later ones
//! local detail.

use nalgebra::DMatrix;

use crate::assignment::{Assigner, FeasibilityMask};
use crate::config::FilterConfig;
use crate::core::{Assignment, CancelToken};
use crate::error::{NumericalError, Result};

/// Result of a filter run.
#[derive(Clone, Debug)]
pub struct FilterOutcome {
    /// Final matches
    pub assignment: Assignment,
    /// Assignment solves performed
    pub iterations: usize,
    /// Whether the assignment stopped changing before the budget ran out
    pub converged: bool,
}

/// Iterative assignment refinement driven by both metrics.
#[derive(Clone, Debug)]
pub struct ProductManifoldFilter {
    config: FilterConfig,
    cancel: Option<CancelToken>,
}

impl ProductManifoldFilter {
    /// Create a filter from its config.
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Check the token once per iteration.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Filter configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Run the filter.
    ///
    /// # Arguments
    /// * `assigner` - solver for each masked assignment problem
    /// * `g_src` - source geodesics (`N_src × N_src`)
    /// * `g_dst` - destination geodesics (`N_dst × N_dst`)
    /// * `affinity` - initial soft correspondence (`N_src × N_dst`)
    pub fn run(
        &self,
        assigner: &dyn Assigner,
        g_src: &DMatrix<f64>,
        g_dst: &DMatrix<f64>,
        affinity: &DMatrix<f64>,
    ) -> Result<FilterOutcome> {
        check_square(g_src, affinity.nrows(), "source geodesics")?;
        check_square(g_dst, affinity.ncols(), "destination geodesics")?;

        let diameter = g_src.max().max(g_dst.max());
        let mut current = affinity.clone();
        let mut previous: Option<Assignment> = None;

        for t in 0..self.config.iterations {
            if let Some(cancel) = &self.cancel {
                cancel.check()?;
            }

            let mask = FeasibilityMask::top_fraction(&current, self.config.feasibility_fraction);
            let assignment = assigner.solve(&current, &mask)?;
            log::debug!(
                "Filter iteration {} ({}): {} matches",
                t,
                assigner.name(),
                assignment.len()
            );

            if previous.as_ref() == Some(&assignment) || assignment.is_empty() {
                return Ok(FilterOutcome {
                    assignment,
                    iterations: t + 1,
                    converged: true,
                });
            }
            if t + 1 < self.config.iterations {
                let sigma = self.config.sigma_at(t) * diameter;
                current = consistency_affinity(g_src, g_dst, &assignment, sigma)?;
            }
            previous = Some(assignment);
        }

        Ok(FilterOutcome {
            assignment: previous.unwrap_or_default(),
            iterations: self.config.iterations,
            converged: false,
        })
    }
}

/// `K_x K_yᵀ` for the matched pairs of `assignment`.
pub fn consistency_affinity(
    g_src: &DMatrix<f64>,
    g_dst: &DMatrix<f64>,
    assignment: &Assignment,
    sigma: f64,
) -> std::result::Result<DMatrix<f64>, NumericalError> {
    let variance = sigma * sigma;
    if !(variance > 0.0 && variance.is_finite()) {
        return Err(NumericalError::DegenerateNormalization("geodesic kernel width"));
    }
    let kernel = |g: &DMatrix<f64>, cols: &[usize]| {
        DMatrix::from_fn(g.nrows(), cols.len(), |v, m| {
            let d = g[(v, cols[m])];
            (-d * d / variance).exp()
        })
    };
    let kx = kernel(g_src, assignment.src());
    let ky = kernel(g_dst, assignment.dst());
    Ok(kx * ky.transpose())
}

fn check_square(
    g: &DMatrix<f64>,
    n: usize,
    context: &'static str,
) -> std::result::Result<(), NumericalError> {
    if g.nrows() != n || g.ncols() != n {
        return Err(NumericalError::DimensionMismatch {
            context,
            expected: n,
            actual: g.nrows(),
        });
    }
    Ok(())
}
