//! Geodesic distortion of an assignment.

use nalgebra::DMatrix;

use crate::core::Assignment;
use crate::error::NumericalError;

/// Mean absolute difference between induced geodesic distances.
///
/// ```text
/// dg = mean over (a, b) of |g_src[i_a, i_b] − g_dst[j_a, j_b]|
/// ```
///
/// Zero for identical meshes under the identity assignment. Symmetric in
/// the two meshes when the assignment is swapped with them.
pub fn geodesic_distortion(
    g_src: &DMatrix<f64>,
    g_dst: &DMatrix<f64>,
    assignment: &Assignment,
) -> Result<f64, NumericalError> {
    if assignment.is_empty() {
        return Err(NumericalError::EmptyAssignment);
    }
    if !assignment.fits(g_src.nrows(), g_dst.nrows()) {
        let largest = assignment.src().iter().max().copied().unwrap_or(0);
        return Err(NumericalError::DimensionMismatch {
            context: "assignment indices",
            expected: g_src.nrows(),
            actual: largest + 1,
        });
    }

    let (i, j) = (assignment.src(), assignment.dst());
    let mut total = 0.0;
    for a in 0..i.len() {
        for b in 0..i.len() {
            total += (g_src[(i[a], i[b])] - g_dst[(j[a], j[b])]).abs();
        }
    }
    Ok(total / (i.len() * i.len()) as f64)
}
