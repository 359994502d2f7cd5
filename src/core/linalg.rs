//! Dense linear algebra helpers on top of nalgebra.
//!
//! All functions take borrowed inputs and return owned results; nothing is
//! modified in place.

use nalgebra::DMatrix;

use crate::error::NumericalError;

/// Solve `min ‖A X − B‖` in the least-squares sense via SVD.
///
/// Fails with [`NumericalError::Singular`] when `A` does not have full column
/// rank, since the solution would not be unique.
pub fn least_squares(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    context: &'static str,
) -> Result<DMatrix<f64>, NumericalError> {
    if a.nrows() != b.nrows() {
        return Err(NumericalError::DimensionMismatch {
            context,
            expected: a.nrows(),
            actual: b.nrows(),
        });
    }
    if a.ncols() == 0 || a.nrows() < a.ncols() {
        return Err(NumericalError::Singular(context));
    }

    let svd = a.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    let eps = max_sv * a.nrows().max(a.ncols()) as f64 * f64::EPSILON;
    if max_sv <= 0.0 || svd.rank(eps) < a.ncols() {
        return Err(NumericalError::Singular(context));
    }

    svd.solve(b, eps).map_err(|_| NumericalError::Singular(context))
}

/// Squared Euclidean distances between every row of `a` and every row of `b`.
///
/// Result has shape `a.nrows() × b.nrows()`.
pub fn pairwise_squared_distances(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
) -> Result<DMatrix<f64>, NumericalError> {
    check_columns(a, b, "pairwise distances")?;
    // Points as columns for contiguous access
    let at = a.transpose();
    let bt = b.transpose();
    Ok(DMatrix::from_fn(a.nrows(), b.nrows(), |i, j| {
        (at.column(i) - bt.column(j)).norm_squared()
    }))
}

/// For every row of `query`, the index of the closest row of `reference`.
///
/// Ties resolve to the lowest reference index, so the result is
/// deterministic.
pub fn nearest_rows(
    query: &DMatrix<f64>,
    reference: &DMatrix<f64>,
) -> Result<Vec<usize>, NumericalError> {
    check_columns(query, reference, "nearest neighbour")?;
    if reference.nrows() == 0 {
        return Err(NumericalError::DimensionMismatch {
            context: "nearest neighbour",
            expected: 1,
            actual: 0,
        });
    }

    let qt = query.transpose();
    let rt = reference.transpose();
    let nearest = qt
        .column_iter()
        .map(|q| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (idx, r) in rt.column_iter().enumerate() {
                let dist = (q - r).norm_squared();
                if dist < best_dist {
                    best_dist = dist;
                    best = idx;
                }
            }
            best
        })
        .collect();
    Ok(nearest)
}

/// Select the given rows of a matrix, in order.
pub fn select_rows(m: &DMatrix<f64>, rows: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), m.ncols(), |r, c| m[(rows[r], c)])
}

fn check_columns(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    context: &'static str,
) -> Result<(), NumericalError> {
    if a.ncols() != b.ncols() {
        return Err(NumericalError::DimensionMismatch {
            context,
            expected: a.ncols(),
            actual: b.ncols(),
        });
    }
    Ok(())
}
