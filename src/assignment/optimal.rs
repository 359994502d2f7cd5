//! Direct optimal bipartite matching.

use nalgebra::DMatrix;

use super::solver::solve_capacitated;
use super::traits::{Assigner, check_shape};
use super::FeasibilityMask;
use crate::core::Assignment;
use crate::error::NumericalError;

/// Exact maximum-affinity matching on the full matrix.
///
/// Wide or tall matrices are both accepted; the shorter side is matched
/// completely when the mask allows it.
#[derive(Clone, Copy, Debug, Default)]
pub struct OptimalAssigner;

impl Assigner for OptimalAssigner {
    fn solve(
        &self,
        affinity: &DMatrix<f64>,
        feasible: &FeasibilityMask,
    ) -> Result<Assignment, NumericalError> {
        check_shape(affinity, feasible)?;
        let (rows, cols) = affinity.shape();

        if rows <= cols {
            let table = solve_capacitated(affinity, feasible, &vec![1; cols]);
            return Ok(Assignment::from_row_table(&table));
        }

        // Match columns to rows, then turn the result around
        let transposed =
            solve_capacitated(&affinity.transpose(), &feasible.transpose(), &vec![1; rows]);
        let mut table = vec![None; rows];
        for (col, row) in transposed.into_iter().enumerate() {
            if let Some(row) = row {
                table[row] = Some(col);
            }
        }
        Ok(Assignment::from_row_table(&table))
    }

    fn name(&self) -> &str {
        "optimal"
    }
}
