//! Graph geodesics.
//!
//! Geodesic distance is approximated by shortest paths along mesh edges,
//! weighted by Euclidean edge length. One Dijkstra run per source vertex.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nalgebra::DMatrix;

/// Weighted adjacency list: `adjacency[v]` holds `(neighbour, length)`.
pub(crate) type Adjacency = Vec<Vec<(usize, f64)>>;

#[derive(Clone, Copy, Debug, PartialEq)]
struct State {
    dist: f64,
    vertex: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on distance, then vertex index
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest path lengths. Unreachable vertices stay infinite.
fn dijkstra(adjacency: &[Vec<(usize, f64)>], source: usize, dist: &mut [f64]) {
    dist.fill(f64::INFINITY);
    dist[source] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State {
        dist: 0.0,
        vertex: source,
    });

    while let Some(State { dist: d, vertex }) = heap.pop() {
        if d > dist[vertex] {
            continue;
        }
        for &(next, length) in &adjacency[vertex] {
            let candidate = d + length;
            if candidate < dist[next] {
                dist[next] = candidate;
                heap.push(State {
                    dist: candidate,
                    vertex: next,
                });
            }
        }
    }
}

/// All-pairs shortest path lengths over a weighted adjacency list.
///
/// Returns `None` if the graph is disconnected. The result is symmetrized so
/// floating-point accumulation order cannot break symmetry.
pub fn all_pairs_geodesics(adjacency: &[Vec<(usize, f64)>]) -> Option<DMatrix<f64>> {
    let n = adjacency.len();
    let mut g = DMatrix::zeros(n, n);
    let mut dist = vec![0.0; n];

    for source in 0..n {
        dijkstra(adjacency, source, &mut dist);
        if dist.iter().any(|d| !d.is_finite()) {
            return None;
        }
        for (target, &d) in dist.iter().enumerate() {
            g[(source, target)] = d;
        }
    }

    let symmetric = (&g + g.transpose()) * 0.5;
    Some(symmetric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn path_graph(lengths: &[f64]) -> Adjacency {
        let mut adjacency = vec![Vec::new(); lengths.len() + 1];
        for (i, &len) in lengths.iter().enumerate() {
            adjacency[i].push((i + 1, len));
            adjacency[i + 1].push((i, len));
        }
        adjacency
    }

    #[test]
    fn test_path_distances() {
        let g = all_pairs_geodesics(&path_graph(&[1.0, 2.0, 0.5])).unwrap();
        assert_relative_eq!(g[(0, 3)], 3.5);
        assert_relative_eq!(g[(3, 0)], 3.5);
        assert_relative_eq!(g[(1, 2)], 2.0);
        for i in 0..4 {
            assert_eq!(g[(i, i)], 0.0);
        }
    }

    #[test]
    fn test_shortcut_taken() {
        let mut adjacency = path_graph(&[1.0, 1.0]);
        adjacency[0].push((2, 1.5));
        adjacency[2].push((0, 1.5));
        let g = all_pairs_geodesics(&adjacency).unwrap();
        assert_relative_eq!(g[(0, 2)], 1.5);
    }

    #[test]
    fn test_disconnected() {
        let adjacency = vec![vec![(1, 1.0)], vec![(0, 1.0)], vec![]];
        assert!(all_pairs_geodesics(&adjacency).is_none());
    }
}
