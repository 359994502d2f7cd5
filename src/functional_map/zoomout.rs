//! Zoomout spectral upsampling.
//!
//! Alternates between recovering a pointwise map from `C` (nearest neighbours
//! in the transported spectral embedding) and refitting `C` one dimension
//! larger from that pointwise map, until the dimension bound is reached.

use nalgebra::DMatrix;

use super::truncated_basis;
use crate::config::ZoomoutSection;
use crate::core::CancelToken;
use crate::core::linalg::{least_squares, nearest_rows};
use crate::error::{NumericalError, Result};
use crate::mesh::MeshMetric;

/// Refinement progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomoutState {
    /// Map as produced by the solver
    Initial(usize),
    /// Map refitted at the given dimension
    Refine(usize),
    /// Dimension bound reached
    Converged(usize),
}

impl ZoomoutState {
    /// Current map dimension.
    pub fn dimension(self) -> usize {
        match self {
            Self::Initial(k) | Self::Refine(k) | Self::Converged(k) => k,
        }
    }
}

/// Pointwise maps in both directions, recovered from a functional map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointwiseMap {
    /// For each destination vertex, its nearest source vertex
    pub dst_to_src: Vec<usize>,
    /// For each source vertex, its nearest destination vertex
    pub src_to_dst: Vec<usize>,
}

/// Outcome of a refinement run.
#[derive(Clone, Debug)]
pub struct ZoomoutResult {
    /// Refined `k_max × k_max` map
    pub map: DMatrix<f64>,
    /// Dimension after the solver and after every step
    pub dimensions: Vec<usize>,
}

impl ZoomoutResult {
    /// Final dimension.
    pub fn dimension(&self) -> usize {
        self.map.nrows()
    }
}

/// Upsamples a functional map to the largest usable dimension.
#[derive(Clone, Debug)]
pub struct ZoomoutRefiner {
    max_dimension: usize,
    step: usize,
    cancel: Option<CancelToken>,
}

impl ZoomoutRefiner {
    /// Refiner bounded by `max_dimension`, growing one dimension per step.
    pub fn new(max_dimension: usize) -> Self {
        Self {
            max_dimension,
            step: 1,
            cancel: None,
        }
    }

    /// Refiner configured from its config section.
    pub fn from_config(config: &ZoomoutSection) -> Self {
        Self {
            max_dimension: config.max_dimension,
            step: config.step.max(1),
            cancel: None,
        }
    }

    /// Dimensions added per step (at least one).
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step.max(1);
        self
    }

    /// Check the token once per step.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Largest dimension both meshes support.
    pub fn dimension_bound(&self, src: &dyn MeshMetric, dst: &dyn MeshMetric) -> usize {
        self.max_dimension
            .min(src.basis_size())
            .min(dst.basis_size())
    }

    /// Refine `c` until the dimension bound.
    ///
    /// A map already at or past the bound is returned unchanged.
    pub fn refine(
        &self,
        src: &dyn MeshMetric,
        dst: &dyn MeshMetric,
        c: &DMatrix<f64>,
    ) -> Result<ZoomoutResult> {
        if c.nrows() != c.ncols() {
            return Err(NumericalError::DimensionMismatch {
                context: "zoomout input map",
                expected: c.nrows(),
                actual: c.ncols(),
            }
            .into());
        }

        let bound = self.dimension_bound(src, dst);
        let mut map = c.clone();
        let mut dimensions = vec![map.nrows()];
        let mut state = ZoomoutState::Initial(map.nrows());

        loop {
            state = match state {
                ZoomoutState::Initial(k) | ZoomoutState::Refine(k) if k < bound => {
                    if let Some(cancel) = &self.cancel {
                        cancel.check()?;
                    }
                    let next = (k + self.step).min(bound);
                    let pointwise = pointwise_map(src, dst, &map)?;
                    map = fit_functional_map(src, dst, &pointwise, next)?;
                    dimensions.push(next);
                    ZoomoutState::Refine(next)
                }
                ZoomoutState::Initial(k) | ZoomoutState::Refine(k) => ZoomoutState::Converged(k),
                ZoomoutState::Converged(_) => break,
            };
        }

        log::debug!(
            "Zoomout finished at dimension {} after {} steps",
            state.dimension(),
            dimensions.len() - 1
        );
        Ok(ZoomoutResult { map, dimensions })
    }
}

/// Nearest neighbours between `Φs Cᵀ` and `Φd` in both directions.
pub fn pointwise_map(
    src: &dyn MeshMetric,
    dst: &dyn MeshMetric,
    c: &DMatrix<f64>,
) -> std::result::Result<PointwiseMap, NumericalError> {
    let k = c.nrows();
    let emb_src = truncated_basis(src, k)? * c.transpose();
    let emb_dst = truncated_basis(dst, k)?;
    Ok(PointwiseMap {
        dst_to_src: nearest_rows(&emb_dst, &emb_src)?,
        src_to_dst: nearest_rows(&emb_src, &emb_dst)?,
    })
}

/// Fit a `k × k` map to a pointwise map in least squares.
///
/// Every pair from both directions contributes one row, so the fit sees
/// `N_src + N_dst` constraints.
pub fn fit_functional_map(
    src: &dyn MeshMetric,
    dst: &dyn MeshMetric,
    pointwise: &PointwiseMap,
    k: usize,
) -> std::result::Result<DMatrix<f64>, NumericalError> {
    let phi_s = truncated_basis(src, k)?;
    let phi_d = truncated_basis(dst, k)?;

    let pairs: Vec<(usize, usize)> = pointwise
        .dst_to_src
        .iter()
        .enumerate()
        .map(|(y, &x)| (x, y))
        .chain(pointwise.src_to_dst.iter().copied().enumerate())
        .collect();

    let a = DMatrix::from_fn(pairs.len(), k, |r, c| phi_s[(pairs[r].0, c)]);
    let b = DMatrix::from_fn(pairs.len(), k, |r, c| phi_d[(pairs[r].1, c)]);
    Ok(least_squares(&a, &b, "zoomout refit")?.transpose())
}
