//! Farthest point sampling on a distance matrix.

use nalgebra::DMatrix;

/// Pick `count` vertices greedily maximizing distance to those already
/// picked.
///
/// Starts at vertex 0 and returns indices in selection order. Ties resolve
/// to the lowest index, so the result is deterministic. `count` is clamped
/// to the number of vertices.
pub fn farthest_point_sampling(g: &DMatrix<f64>, count: usize) -> Vec<usize> {
    let n = g.nrows();
    let count = count.min(n);
    if count == 0 {
        return Vec::new();
    }

    let mut selected = Vec::with_capacity(count);
    let mut min_dist = vec![f64::INFINITY; n];
    let mut next = 0;

    while selected.len() < count {
        selected.push(next);
        for (v, d) in min_dist.iter_mut().enumerate() {
            *d = d.min(g[(next, v)]);
        }

        let mut best = f64::NEG_INFINITY;
        for (v, &d) in min_dist.iter().enumerate() {
            if d > best {
                best = d;
                next = v;
            }
        }
        if best <= 0.0 {
            // Every remaining vertex coincides with a selected one
            break;
        }
    }
    selected
}
