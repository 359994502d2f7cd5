//! Feasibility masks over affinity matrices.

use nalgebra::DMatrix;

/// Boolean `rows × cols` matrix of pairs the assignment solver may choose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeasibilityMask {
    rows: usize,
    cols: usize,
    /// Row-major
    data: Vec<bool>,
}

impl FeasibilityMask {
    /// Every pair feasible.
    pub fn all(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![true; rows * cols],
        }
    }

    /// No pair feasible.
    pub fn none(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![false; rows * cols],
        }
    }

    /// Mask from a predicate on `(row, col)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Mutual top-n selection.
    ///
    /// Keeps the `max(1, ⌊fraction · cols⌋)` highest affinities of every row
    /// and the `max(1, ⌊fraction · rows⌋)` highest of every column, then
    /// takes the union. Ties resolve to the lowest index. Non-finite
    /// affinities rank last.
    pub fn top_fraction(affinity: &DMatrix<f64>, fraction: f64) -> Self {
        let (rows, cols) = affinity.shape();
        let mut mask = Self::none(rows, cols);
        if rows == 0 || cols == 0 {
            return mask;
        }

        let rank = |v: f64| if v.is_finite() { v } else { f64::NEG_INFINITY };
        let per_row = top_count(fraction, cols);
        let per_col = top_count(fraction, rows);

        let mut order: Vec<usize> = Vec::with_capacity(rows.max(cols));
        for r in 0..rows {
            order.clear();
            order.extend(0..cols);
            // Stable sort keeps lower indices first among equal values
            order.sort_by(|&a, &b| rank(affinity[(r, b)]).total_cmp(&rank(affinity[(r, a)])));
            for &c in &order[..per_row] {
                mask.set(r, c, true);
            }
        }
        for c in 0..cols {
            order.clear();
            order.extend(0..rows);
            order.sort_by(|&a, &b| rank(affinity[(b, c)]).total_cmp(&rank(affinity[(a, c)])));
            for &r in &order[..per_col] {
                mask.set(r, c, true);
            }
        }
        mask
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether `(row, col)` is feasible.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[row * self.cols + col]
    }

    /// Mark `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, feasible: bool) {
        self.data[row * self.cols + col] = feasible;
    }

    /// Pairs feasible in either mask. Shapes must match.
    pub fn union(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a || b)
    }

    /// Pairs feasible in both masks. Shapes must match.
    pub fn intersect(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a && b)
    }

    /// Number of feasible pairs.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&f| f).count()
    }

    /// Whether a row has no feasible column.
    pub fn row_is_empty(&self, row: usize) -> bool {
        !self.data[row * self.cols..(row + 1) * self.cols]
            .iter()
            .any(|&f| f)
    }

    /// Mask with rows and columns exchanged.
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |r, c| self.get(c, r))
    }

    fn zip_with(&self, other: &Self, op: impl Fn(bool, bool) -> bool) -> Self {
        debug_assert_eq!(self.shape(), other.shape());
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| op(a, b))
                .collect(),
        }
    }
}

fn top_count(fraction: f64, len: usize) -> usize {
    ((fraction * len as f64).floor() as usize).clamp(1, len)
}
