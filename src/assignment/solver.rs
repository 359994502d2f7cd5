//! Capacitated min-cost assignment by successive shortest paths.
//!
//! Each round runs Dijkstra over the residual graph from all unassigned rows
//! at once (with Johnson potentials keeping reduced costs non-negative) and
//! augments along the cheapest path to a column with spare capacity,
//! possibly moving or displacing previously assigned rows on the way. Rounds
//! stop once no augmenting path remains.
//!
//! Cost of pair `(r, c)` is `max P − P[r, c]`, so the result matches as many
//! rows as the mask allows and, among those matchings, maximizes total
//! affinity.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nalgebra::DMatrix;

use super::FeasibilityMask;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Node {
    Row(usize),
    Col(usize),
    Sink,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    dist: f64,
    node: Node,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.dist.total_cmp(&other.dist) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap
        other.dist.total_cmp(&self.dist)
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Assign rows to columns maximizing total affinity.
///
/// Column `c` accepts at most `capacities[c]` rows. Only feasible pairs with
/// finite affinity are considered. Returns the column chosen for each row;
/// rows that cannot be routed to any column stay `None`.
pub(crate) fn solve_capacitated(
    affinity: &DMatrix<f64>,
    feasible: &FeasibilityMask,
    capacities: &[usize],
) -> Vec<Option<usize>> {
    let (rows, cols) = affinity.shape();
    debug_assert_eq!(feasible.shape(), (rows, cols));
    debug_assert_eq!(capacities.len(), cols);

    let usable = |r: usize, c: usize| feasible.get(r, c) && affinity[(r, c)].is_finite();
    let mut max_affinity = f64::NEG_INFINITY;
    for r in 0..rows {
        for c in 0..cols {
            if usable(r, c) {
                max_affinity = max_affinity.max(affinity[(r, c)]);
            }
        }
    }
    let cost = |r: usize, c: usize| max_affinity - affinity[(r, c)];

    let mut row_col: Vec<Option<usize>> = vec![None; rows];
    let mut col_rows: Vec<Vec<usize>> = vec![Vec::new(); cols];
    let mut row_pot = vec![0.0; rows];
    let mut col_pot = vec![0.0; cols];
    let mut sink_pot = 0.0;

    let mut row_dist = vec![f64::INFINITY; rows];
    let mut col_dist = vec![f64::INFINITY; cols];
    let mut row_done = vec![false; rows];
    let mut col_done = vec![false; cols];
    // Row that reached each column
    let mut col_prev = vec![usize::MAX; cols];

    loop {
        row_dist.fill(f64::INFINITY);
        col_dist.fill(f64::INFINITY);
        row_done.fill(false);
        col_done.fill(false);
        let mut sink_dist = f64::INFINITY;
        let mut sink_prev = usize::MAX;

        // Every unassigned row is a source; their potentials stay at zero
        let mut heap = BinaryHeap::new();
        for r in 0..rows {
            if row_col[r].is_none() && (0..cols).any(|c| usable(r, c)) {
                row_dist[r] = 0.0;
                heap.push(Entry {
                    dist: 0.0,
                    node: Node::Row(r),
                });
            }
        }
        if heap.is_empty() {
            break;
        }

        while let Some(Entry { dist, node }) = heap.pop() {
            match node {
                Node::Sink => break,
                Node::Row(r) => {
                    if row_done[r] {
                        continue;
                    }
                    row_done[r] = true;
                    for c in 0..cols {
                        if col_done[c] || row_col[r] == Some(c) || !usable(r, c) {
                            continue;
                        }
                        let reduced = (cost(r, c) + row_pot[r] - col_pot[c]).max(0.0);
                        let candidate = dist + reduced;
                        if candidate < col_dist[c] {
                            col_dist[c] = candidate;
                            col_prev[c] = r;
                            heap.push(Entry {
                                dist: candidate,
                                node: Node::Col(c),
                            });
                        }
                    }
                }
                Node::Col(c) => {
                    if col_done[c] {
                        continue;
                    }
                    col_done[c] = true;
                    if col_rows[c].len() < capacities[c] {
                        let candidate = dist + (col_pot[c] - sink_pot).max(0.0);
                        if candidate < sink_dist {
                            sink_dist = candidate;
                            sink_prev = c;
                            heap.push(Entry {
                                dist: candidate,
                                node: Node::Sink,
                            });
                        }
                    }
                    for &r in &col_rows[c] {
                        if row_done[r] {
                            continue;
                        }
                        let reduced = (-cost(r, c) + col_pot[c] - row_pot[r]).max(0.0);
                        let candidate = dist + reduced;
                        if candidate < row_dist[r] {
                            row_dist[r] = candidate;
                            heap.push(Entry {
                                dist: candidate,
                                node: Node::Row(r),
                            });
                        }
                    }
                }
            }
        }

        // No augmenting path left: the flow is maximum
        if !sink_dist.is_finite() {
            break;
        }

        for r in 0..rows {
            row_pot[r] += row_dist[r].min(sink_dist);
        }
        for c in 0..cols {
            col_pot[c] += col_dist[c].min(sink_dist);
        }
        sink_pot += sink_dist;

        // Walk back from the sink, shifting each row on the path one column over
        let mut col = sink_prev;
        loop {
            let row = col_prev[col];
            let previous = row_col[row].replace(col);
            col_rows[col].push(row);
            match previous {
                Some(old) => {
                    col_rows[old].retain(|&x| x != row);
                    col = old;
                }
                None => break,
            }
        }
    }

    row_col
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(affinity: &DMatrix<f64>, table: &[Option<usize>]) -> f64 {
        table
            .iter()
            .enumerate()
            .filter_map(|(r, c)| c.map(|c| affinity[(r, c)]))
            .sum()
    }

    #[test]
    fn test_square_optimum() {
        let p = DMatrix::from_row_slice(3, 3, &[
            4.0, 1.0, 3.0, //
            2.0, 0.0, 5.0, //
            3.0, 2.0, 2.0,
        ]);
        let table = solve_capacitated(&p, &FeasibilityMask::all(3, 3), &[1, 1, 1]);
        assert_eq!(table, vec![Some(0), Some(2), Some(1)]);
        assert_eq!(total(&p, &table), 11.0);
    }

    #[test]
    fn test_reroutes_earlier_row() {
        // Greedy would give row 0 column 0; the optimum moves it
        let p = DMatrix::from_row_slice(2, 2, &[
            5.0, 4.0, //
            5.0, 0.0,
        ]);
        let table = solve_capacitated(&p, &FeasibilityMask::all(2, 2), &[1, 1]);
        assert_eq!(table, vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_capacity_shared() {
        let p = DMatrix::from_row_slice(3, 2, &[
            1.0, 0.0, //
            1.0, 0.0, //
            0.9, 0.0,
        ]);
        let table = solve_capacitated(&p, &FeasibilityMask::all(3, 2), &[2, 1]);
        assert_eq!(table.iter().filter(|c| **c == Some(0)).count(), 2);
        assert_eq!(table.iter().filter(|c| **c == Some(1)).count(), 1);
        assert_eq!(table[2], Some(1));
    }

    #[test]
    fn test_infeasible_row_unassigned() {
        let p = DMatrix::from_element(2, 2, 1.0);
        let mask = FeasibilityMask::from_fn(2, 2, |r, _| r == 0);
        let table = solve_capacitated(&p, &mask, &[1, 1]);
        assert!(table[0].is_some());
        assert_eq!(table[1], None);
    }

    #[test]
    fn test_cardinality_before_affinity() {
        // Row 1 can only use column 0, so row 0 gives it up
        let p = DMatrix::from_row_slice(2, 2, &[
            1.0, 0.1, //
            0.2, 0.0,
        ]);
        let mask = FeasibilityMask::from_fn(2, 2, |r, c| r == 0 || c == 0);
        let table = solve_capacitated(&p, &mask, &[1, 1]);
        assert_eq!(table, vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_later_row_displaces_worse_row() {
        // Only column 0 is feasible; row 1 is the better holder
        let p = DMatrix::from_row_slice(2, 2, &[
            0.2, 0.3, //
            0.8, 0.7,
        ]);
        let mask = FeasibilityMask::from_fn(2, 2, |_, c| c == 0);
        let table = solve_capacitated(&p, &mask, &[1, 1]);
        assert_eq!(table, vec![None, Some(0)]);
    }

    #[test]
    fn test_sparse_mask_prefers_better_rows() {
        // Row 0 can only reach column 0, rows 1 and 2 compete for column 1
        let p = DMatrix::from_row_slice(3, 2, &[
            0.1, 0.0, //
            0.9, 0.2, //
            0.0, 0.6,
        ]);
        let mask = FeasibilityMask::from_fn(3, 2, |r, c| match r {
            0 => c == 0,
            1 => true,
            _ => c == 1,
        });
        let table = solve_capacitated(&p, &mask, &[1, 1]);
        assert_eq!(table, vec![None, Some(0), Some(1)]);
        assert!((total(&p, &table) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_nan_treated_as_infeasible() {
        let p = DMatrix::from_row_slice(1, 2, &[f64::NAN, 0.5]);
        let table = solve_capacitated(&p, &FeasibilityMask::all(1, 2), &[1, 1]);
        assert_eq!(table, vec![Some(1)]);
    }
}
