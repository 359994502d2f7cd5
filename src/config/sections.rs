//! Configuration sections.

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::error::ConfigError;

/// Functional map solver settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolverSection {
    /// Weight of the Laplacian commutativity term.
    /// 0 disables the regularizer.
    #[serde(default = "defaults::commutativity_weight")]
    pub commutativity_weight: f64,

    /// Minimum residual improvement for the reflected candidate to win.
    /// Differences within this tolerance count as a tie, which keeps the
    /// direct solution.
    #[serde(default = "defaults::residual_tolerance")]
    pub residual_tolerance: f64,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            commutativity_weight: defaults::commutativity_weight(),
            residual_tolerance: defaults::residual_tolerance(),
        }
    }
}

impl SolverSection {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(self.commutativity_weight >= 0.0 && self.commutativity_weight.is_finite()) {
            return Err(ConfigError::OutOfRange {
                field: "solver.commutativity_weight",
                reason: format!("must be finite and >= 0, got {}", self.commutativity_weight),
            });
        }
        if !(self.residual_tolerance >= 0.0 && self.residual_tolerance.is_finite()) {
            return Err(ConfigError::OutOfRange {
                field: "solver.residual_tolerance",
                reason: format!("must be finite and >= 0, got {}", self.residual_tolerance),
            });
        }
        Ok(())
    }
}

/// Zoomout refinement settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoomoutSection {
    /// Upper bound on the refined dimension.
    /// The effective bound is also limited by both meshes' basis sizes.
    #[serde(default = "defaults::max_dimension")]
    pub max_dimension: usize,

    /// Dimension increase per refinement step.
    #[serde(default = "defaults::zoomout_step")]
    pub step: usize,
}

impl Default for ZoomoutSection {
    fn default() -> Self {
        Self {
            max_dimension: defaults::max_dimension(),
            step: defaults::zoomout_step(),
        }
    }
}

impl ZoomoutSection {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.step == 0 {
            return Err(ConfigError::OutOfRange {
                field: "zoomout.step",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Soft correspondence kernel settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SoftCorrespondenceSection {
    /// Kernel width relative to the mean squared embedding distance.
    /// Affinity is `exp(-d² / (kernel_width · mean(d²)))`.
    #[serde(default = "defaults::kernel_width")]
    pub kernel_width: f64,
}

impl Default for SoftCorrespondenceSection {
    fn default() -> Self {
        Self {
            kernel_width: defaults::kernel_width(),
        }
    }
}

impl SoftCorrespondenceSection {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(self.kernel_width > 0.0 && self.kernel_width.is_finite()) {
            return Err(ConfigError::OutOfRange {
                field: "soft_correspondence.kernel_width",
                reason: format!("must be finite and > 0, got {}", self.kernel_width),
            });
        }
        Ok(())
    }
}

/// Which assignment solver the filter drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignerKind {
    /// Optimal bipartite matching on the full affinity matrix
    Optimal,
    /// Decimation-based reduced assignment
    Elastic,
}

/// Product manifold filter settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Iteration budget (at least 1).
    pub iterations: usize,

    /// Fraction of candidates kept per row and per column, in (0, 1].
    pub feasibility_fraction: f64,

    /// Assignment solver.
    pub assigner: AssignerKind,

    /// Decimation ratio for the elastic assigner (subset size ≈ N / stretch).
    /// Required when `assigner` is `elastic`.
    #[serde(default)]
    pub stretch: Option<f64>,

    /// Geodesic kernel width of the first iteration, relative to the larger
    /// of the two geodesic diameters.
    #[serde(default = "defaults::sigma_start")]
    pub sigma_start: f64,

    /// Geodesic kernel width of the last iteration, relative to the larger
    /// of the two geodesic diameters.
    #[serde(default = "defaults::sigma_end")]
    pub sigma_end: f64,
}

impl FilterConfig {
    /// Filter driving the optimal assigner.
    pub fn optimal(iterations: usize, feasibility_fraction: f64) -> Self {
        Self {
            iterations,
            feasibility_fraction,
            assigner: AssignerKind::Optimal,
            stretch: None,
            sigma_start: defaults::sigma_start(),
            sigma_end: defaults::sigma_end(),
        }
    }

    /// Filter driving the elastic assigner.
    pub fn elastic(iterations: usize, feasibility_fraction: f64, stretch: f64) -> Self {
        Self {
            assigner: AssignerKind::Elastic,
            stretch: Some(stretch),
            ..Self::optimal(iterations, feasibility_fraction)
        }
    }

    /// Kernel width for iteration `t`, geometrically interpolated from
    /// `sigma_start` to `sigma_end`.
    pub fn sigma_at(&self, t: usize) -> f64 {
        if self.iterations <= 1 {
            return self.sigma_start;
        }
        let alpha = t.min(self.iterations - 1) as f64 / (self.iterations - 1) as f64;
        self.sigma_start * (self.sigma_end / self.sigma_start).powf(alpha)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::OutOfRange {
                field: "product_manifold_filter.iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.feasibility_fraction > 0.0 && self.feasibility_fraction <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "product_manifold_filter.feasibility_fraction",
                reason: format!("must be in (0, 1], got {}", self.feasibility_fraction),
            });
        }
        for (field, sigma) in [
            ("product_manifold_filter.sigma_start", self.sigma_start),
            ("product_manifold_filter.sigma_end", self.sigma_end),
        ] {
            if !(sigma > 0.0 && sigma.is_finite()) {
                return Err(ConfigError::OutOfRange {
                    field,
                    reason: format!("must be finite and > 0, got {}", sigma),
                });
            }
        }
        match (self.assigner, self.stretch) {
            (AssignerKind::Elastic, None) => Err(ConfigError::OutOfRange {
                field: "product_manifold_filter.stretch",
                reason: "required for the elastic assigner".to_string(),
            }),
            (_, Some(stretch)) if !(stretch >= 1.0 && stretch.is_finite()) => {
                Err(ConfigError::OutOfRange {
                    field: "product_manifold_filter.stretch",
                    reason: format!("must be finite and >= 1, got {}", stretch),
                })
            }
            _ => Ok(()),
        }
    }
}
