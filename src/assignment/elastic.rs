//! Size-reduced assignment through destination decimation.
//!
//! ## Algorithm
//!
//! 1. Decimate the destination to `N / stretch` representatives (farthest
//!    point sampling on geodesics)
//! 2. Attach every destination vertex to its geodesically nearest
//!    representative, forming clusters
//! 3. Sum affinity columns per cluster and keep the mutual top fraction of
//!    the reduced matrix (restricted to clusters with a feasible member)
//! 4. Assign source rows to clusters, each cluster accepting as many rows as
//!    it has members feasible for some row
//! 5. Inside every cluster, match its rows to its members optimally under
//!    the caller's mask so the expanded destination indices stay distinct

use nalgebra::DMatrix;

use super::solver::solve_capacitated;
use super::traits::{Assigner, check_shape};
use super::FeasibilityMask;
use crate::core::Assignment;
use crate::error::{ConfigError, Error, NumericalError};
use crate::mesh::MeshMetric;

/// Assigner solving on a decimated destination and expanding back.
#[derive(Clone, Debug)]
pub struct ElasticAssigner {
    /// Representative destination vertices
    representatives: Vec<usize>,
    /// Cluster of every destination vertex
    membership: Vec<usize>,
    /// Members of every cluster, nearest to the representative first
    clusters: Vec<Vec<usize>>,
    feasibility_fraction: f64,
}

impl ElasticAssigner {
    /// Decimate `mesh` (the destination) by `stretch`.
    ///
    /// Fails if the decimation keeps no representative.
    pub fn new(
        mesh: &dyn MeshMetric,
        stretch: f64,
        feasibility_fraction: f64,
    ) -> Result<Self, Error> {
        if !(stretch >= 1.0 && stretch.is_finite()) {
            return Err(ConfigError::OutOfRange {
                field: "product_manifold_filter.stretch",
                reason: format!("must be a finite value >= 1, got {}", stretch),
            }
            .into());
        }
        let representatives = mesh.decimate(1.0 / stretch)?;
        if representatives.is_empty() {
            return Err(ConfigError::EmptyDecimation {
                stretch,
                vertices: mesh.num_vertices(),
            }
            .into());
        }

        let g = mesh.geodesics();
        let membership: Vec<usize> = (0..mesh.num_vertices())
            .map(|v| {
                let mut best = 0;
                for (r, &rep) in representatives.iter().enumerate().skip(1) {
                    if g[(rep, v)] < g[(representatives[best], v)] {
                        best = r;
                    }
                }
                best
            })
            .collect();

        let mut clusters = vec![Vec::new(); representatives.len()];
        for (v, &r) in membership.iter().enumerate() {
            clusters[r].push(v);
        }
        for (cluster, &rep) in clusters.iter_mut().zip(&representatives) {
            cluster.sort_by(|&a, &b| g[(rep, a)].total_cmp(&g[(rep, b)]).then(a.cmp(&b)));
        }

        log::debug!(
            "Elastic assigner on `{}`: {} representatives for {} vertices",
            mesh.name(),
            representatives.len(),
            membership.len()
        );

        Ok(Self {
            representatives,
            membership,
            clusters,
            feasibility_fraction,
        })
    }

    /// Representative vertex of every cluster.
    pub fn representatives(&self) -> &[usize] {
        &self.representatives
    }

    /// Cluster index of every destination vertex.
    pub fn membership(&self) -> &[usize] {
        &self.membership
    }

    /// Number of clusters.
    pub fn num_clusters(&self) -> usize {
        self.representatives.len()
    }

    /// Sum the rows of a per-vertex field into per-cluster rows.
    ///
    /// `field` has one row per destination vertex; the result has one row
    /// per cluster. Rows of vertices in the same cluster accumulate.
    pub fn reduce_field(&self, field: &DMatrix<f64>) -> Result<DMatrix<f64>, NumericalError> {
        if field.nrows() != self.membership.len() {
            return Err(NumericalError::DimensionMismatch {
                context: "elastic field reduction",
                expected: self.membership.len(),
                actual: field.nrows(),
            });
        }
        let mut reduced = DMatrix::zeros(self.num_clusters(), field.ncols());
        for (v, &r) in self.membership.iter().enumerate() {
            let mut row = reduced.row_mut(r);
            row += field.row(v);
        }
        Ok(reduced)
    }

    fn reduced_mask(&self, reduced: &DMatrix<f64>, feasible: &FeasibilityMask) -> FeasibilityMask {
        let mut any_member = FeasibilityMask::none(feasible.rows(), self.num_clusters());
        for row in 0..feasible.rows() {
            for (v, &r) in self.membership.iter().enumerate() {
                if feasible.get(row, v) {
                    any_member.set(row, r, true);
                }
            }
        }
        FeasibilityMask::top_fraction(reduced, self.feasibility_fraction).intersect(&any_member)
    }
}

impl Assigner for ElasticAssigner {
    fn solve(
        &self,
        affinity: &DMatrix<f64>,
        feasible: &FeasibilityMask,
    ) -> Result<Assignment, NumericalError> {
        check_shape(affinity, feasible)?;
        if affinity.ncols() != self.membership.len() {
            return Err(NumericalError::DimensionMismatch {
                context: "elastic assigner columns",
                expected: self.membership.len(),
                actual: affinity.ncols(),
            });
        }

        let reduced = self.reduce_field(&affinity.transpose())?.transpose();
        let mask = self.reduced_mask(&reduced, feasible);
        // Members no row may take never count toward a cluster's capacity
        let capacities: Vec<usize> = self
            .clusters
            .iter()
            .map(|members| {
                members
                    .iter()
                    .filter(|&&v| (0..feasible.rows()).any(|row| feasible.get(row, v)))
                    .count()
            })
            .collect();
        let coarse = solve_capacitated(&reduced, &mask, &capacities);

        let mut rows_of = vec![Vec::new(); self.num_clusters()];
        for (row, cluster) in coarse.iter().enumerate() {
            if let Some(r) = cluster {
                rows_of[*r].push(row);
            }
        }

        let mut table = vec![None; affinity.nrows()];
        for (rows, members) in rows_of.iter().zip(&self.clusters) {
            if rows.is_empty() {
                continue;
            }
            let block = DMatrix::from_fn(rows.len(), members.len(), |a, b| {
                affinity[(rows[a], members[b])]
            });
            let block_mask = FeasibilityMask::from_fn(rows.len(), members.len(), |a, b| {
                feasible.get(rows[a], members[b])
            });
            let local = solve_capacitated(&block, &block_mask, &vec![1; members.len()]);
            for (a, b) in local.into_iter().enumerate() {
                table[rows[a]] = b.map(|b| members[b]);
            }
        }
        Ok(Assignment::from_row_table(&table))
    }

    fn name(&self) -> &str {
        "elastic"
    }
}
