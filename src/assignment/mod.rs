//! Discrete assignment over masked affinity matrices.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`FeasibilityMask`] | Which `(row, col)` pairs a solver may choose |
//! | [`Assigner`] | Maximize total affinity over a masked matrix |
//! | [`OptimalAssigner`] | Exact matching on the full matrix |
//! | [`ElasticAssigner`] | Matching on a decimated destination, expanded back |
//!
//! Both assigners share one capacitated min-cost solver; the optimal variant
//! gives every column capacity one, the elastic variant gives every cluster
//! its member count.

mod elastic;
mod feasibility;
mod optimal;
mod solver;
mod traits;

pub use elastic::ElasticAssigner;
pub use feasibility::FeasibilityMask;
pub use optimal::OptimalAssigner;
pub use traits::Assigner;

use crate::config::{AssignerKind, FilterConfig};
use crate::error::{ConfigError, Error};
use crate::mesh::MeshMetric;

/// Build the assigner selected by a filter config.
///
/// The elastic assigner decimates `destination`.
pub fn assigner_for(
    config: &FilterConfig,
    destination: &dyn MeshMetric,
) -> Result<Box<dyn Assigner>, Error> {
    match config.assigner {
        AssignerKind::Optimal => Ok(Box::new(OptimalAssigner)),
        AssignerKind::Elastic => {
            let stretch = config.stretch.ok_or_else(|| ConfigError::OutOfRange {
                field: "product_manifold_filter.stretch",
                reason: "required by the elastic assigner".to_string(),
            })?;
            Ok(Box::new(ElasticAssigner::new(
                destination,
                stretch,
                config.feasibility_fraction,
            )?))
        }
    }
}
