//! Trait for assignment solvers.

use nalgebra::DMatrix;

use super::FeasibilityMask;
use crate::core::Assignment;
use crate::error::NumericalError;

/// Maximizes total affinity over a masked matrix.
///
/// Implementations return an injective partial mapping from rows to columns
/// using only feasible pairs. Rows without any reachable feasible column are
/// left out of the result rather than reported as errors.
///
/// # Example
///
/// ```
/// use micro_match::assignment::{Assigner, FeasibilityMask, OptimalAssigner};
/// use nalgebra::DMatrix;
///
/// let affinity = DMatrix::from_row_slice(2, 2, &[0.1, 0.9, 0.8, 0.2]);
/// let assignment = OptimalAssigner
///     .solve(&affinity, &FeasibilityMask::all(2, 2))
///     .unwrap();
/// assert_eq!(assignment.dst(), &[1, 0]);
/// ```
pub trait Assigner: Send + Sync {
    /// Solve the assignment problem.
    ///
    /// # Arguments
    /// * `affinity` - `N_src × N_dst` similarities, larger is better
    /// * `feasible` - pairs the solver may choose, same shape as `affinity`
    ///
    /// # Returns
    /// Matched pairs with `src` in ascending order
    fn solve(
        &self,
        affinity: &DMatrix<f64>,
        feasible: &FeasibilityMask,
    ) -> Result<Assignment, NumericalError>;

    /// Get the name of this assigner for logging/debugging
    fn name(&self) -> &str;
}

pub(crate) fn check_shape(
    affinity: &DMatrix<f64>,
    feasible: &FeasibilityMask,
) -> Result<(), NumericalError> {
    if affinity.nrows() != feasible.rows() {
        return Err(NumericalError::DimensionMismatch {
            context: "feasibility mask rows",
            expected: affinity.nrows(),
            actual: feasible.rows(),
        });
    }
    if affinity.ncols() != feasible.cols() {
        return Err(NumericalError::DimensionMismatch {
            context: "feasibility mask columns",
            expected: affinity.ncols(),
            actual: feasible.cols(),
        });
    }
    Ok(())
}
