//! Reference [`MeshMetric`] implementation.

use std::collections::BTreeSet;

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{DMatrix, DVector, Point3, Rotation3, Vector3};

use super::geodesic::{Adjacency, all_pairs_geodesics};
use super::sampling::farthest_point_sampling;
use super::spectral::{SpectralConfig, SpectralData};
use super::MeshMetric;
use crate::error::MeshError;

/// Surface mesh with graph geodesics and a Laplacian eigenbasis.
///
/// Everything the pipeline needs is computed once at construction:
///
/// 1. Edge graph weighted by Euclidean edge length
/// 2. All-pairs geodesics (Dijkstra from every vertex)
/// 3. Smallest Laplacian eigenpairs and heat kernel signatures
///
/// Geodesics cost `O(N · E log N)` time and `O(N²)` memory, the eigensolve
/// `O(N³)`; meshes are expected to be decimated to a few thousand vertices.
#[derive(Clone, Debug)]
pub struct SurfaceMesh {
    name: String,
    positions: Vec<Point3<f64>>,
    edges: Vec<(usize, usize)>,
    geodesics: DMatrix<f64>,
    spectral_config: SpectralConfig,
    spectral: SpectralData,
}

impl SurfaceMesh {
    /// Build from vertices and an undirected edge list.
    pub fn from_edges(
        name: impl Into<String>,
        positions: Vec<Point3<f64>>,
        edges: &[(usize, usize)],
        spectral: &SpectralConfig,
    ) -> Result<Self, MeshError> {
        let name = name.into();
        let n = positions.len();
        if n == 0 {
            return Err(MeshError::Empty(name));
        }
        if spectral.basis_size > n {
            return Err(MeshError::BasisTooLarge {
                mesh: name,
                requested: spectral.basis_size,
                vertices: n,
            });
        }

        let mut unique = BTreeSet::new();
        for &(a, b) in edges {
            if let Some(&index) = [a, b].iter().find(|&&v| v >= n) {
                return Err(MeshError::InvalidIndex {
                    mesh: name,
                    index,
                    count: n,
                });
            }
            if a != b {
                unique.insert((a.min(b), a.max(b)));
            }
        }
        let edges: Vec<(usize, usize)> = unique.into_iter().collect();

        let mut adjacency: Adjacency = vec![Vec::new(); n];
        for &(a, b) in &edges {
            let length = (positions[a] - positions[b]).norm();
            adjacency[a].push((b, length));
            adjacency[b].push((a, length));
        }

        let geodesics =
            all_pairs_geodesics(&adjacency).ok_or_else(|| MeshError::Disconnected(name.clone()))?;
        let spectral_data = SpectralData::compute(&adjacency, spectral);

        log::debug!(
            "Built mesh `{}`: {} vertices, {} edges, basis {}",
            name,
            n,
            edges.len(),
            spectral_data.basis.ncols()
        );

        Ok(Self {
            name,
            positions,
            edges,
            geodesics,
            spectral_config: spectral.clone(),
            spectral: spectral_data,
        })
    }

    /// Build from vertices and triangles.
    pub fn from_triangles(
        name: impl Into<String>,
        positions: Vec<Point3<f64>>,
        triangles: &[[usize; 3]],
        spectral: &SpectralConfig,
    ) -> Result<Self, MeshError> {
        let edges: Vec<(usize, usize)> = triangles
            .iter()
            .flat_map(|&[a, b, c]| [(a, b), (b, c), (c, a)])
            .collect();
        Self::from_edges(name, positions, &edges, spectral)
    }

    /// Build from a point cloud, connecting each point to its `neighbours`
    /// nearest points.
    pub fn from_point_cloud(
        name: impl Into<String>,
        positions: Vec<Point3<f64>>,
        neighbours: usize,
        spectral: &SpectralConfig,
    ) -> Result<Self, MeshError> {
        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (i, p) in positions.iter().enumerate() {
            tree.add(&[p.x, p.y, p.z], i as u64);
        }

        let mut edges = Vec::with_capacity(positions.len() * neighbours);
        for (i, p) in positions.iter().enumerate() {
            let nearest = tree.nearest_n::<SquaredEuclidean>(&[p.x, p.y, p.z], neighbours + 1);
            for neighbour in nearest {
                let j = neighbour.item as usize;
                if j != i {
                    edges.push((i, j));
                }
            }
        }
        Self::from_edges(name, positions, &edges, spectral)
    }

    /// Rebuild centered at the centroid with unit geodesic diameter.
    pub fn normalised(&self) -> Result<Self, MeshError> {
        let diameter = self.geodesics.max();
        let scale = if diameter > 0.0 { 1.0 / diameter } else { 1.0 };
        let centroid = centroid(&self.positions);
        let positions = self
            .positions
            .iter()
            .map(|p| Point3::from((p.coords - centroid) * scale))
            .collect();
        Self::from_edges(self.name.clone(), positions, &self.edges, &self.spectral_config)
    }

    /// Same mesh under another identifier.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Rigidly rotated copy. Intrinsic data is unchanged.
    pub fn rotated(&self, rotation: &Rotation3<f64>) -> Self {
        Self {
            positions: self.positions.iter().map(|p| rotation * p).collect(),
            ..self.clone()
        }
    }

    /// Undirected edges, each once with `a < b`.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Spectral settings used at construction.
    pub fn spectral_config(&self) -> &SpectralConfig {
        &self.spectral_config
    }
}

fn centroid(points: &[Point3<f64>]) -> Vector3<f64> {
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    sum / points.len().max(1) as f64
}

impl MeshMetric for SurfaceMesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    fn geodesics(&self) -> &DMatrix<f64> {
        &self.geodesics
    }

    fn eigenvalues(&self) -> &DVector<f64> {
        &self.spectral.eigenvalues
    }

    fn basis(&self) -> &DMatrix<f64> {
        &self.spectral.basis
    }

    fn descriptors(&self) -> &DMatrix<f64> {
        &self.spectral.descriptors
    }

    fn decimate(&self, fraction: f64) -> Result<Vec<usize>, MeshError> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(MeshError::InvalidFraction(fraction));
        }
        let count = (self.num_vertices() as f64 * fraction).round() as usize;
        Ok(farthest_point_sampling(&self.geodesics, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        (positions, vec![[0, 1, 2], [0, 2, 3]])
    }

    #[test]
    fn test_triangles_geodesics() {
        let (positions, triangles) = square();
        let mesh =
            SurfaceMesh::from_triangles("sq", positions, &triangles, &SpectralConfig::metric_only())
                .unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.edges().len(), 5);
        assert_relative_eq!(mesh.geodesics()[(0, 2)], 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(mesh.geodesics()[(1, 3)], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_index() {
        let (positions, _) = square();
        let err = SurfaceMesh::from_triangles(
            "sq",
            positions,
            &[[0, 1, 9]],
            &SpectralConfig::metric_only(),
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::InvalidIndex { index: 9, .. }));
    }

    #[test]
    fn test_disconnected() {
        let (positions, _) = square();
        let err =
            SurfaceMesh::from_edges("sq", positions, &[(0, 1), (2, 3)], &SpectralConfig::metric_only())
                .unwrap_err();
        assert_eq!(err, MeshError::Disconnected("sq".to_string()));
    }

    #[test]
    fn test_basis_too_large() {
        let (positions, triangles) = square();
        let spectral = SpectralConfig {
            basis_size: 5,
            descriptor_count: 1,
        };
        assert!(matches!(
            SurfaceMesh::from_triangles("sq", positions, &triangles, &spectral),
            Err(MeshError::BasisTooLarge { .. })
        ));
    }

    #[test]
    fn test_normalised_diameter() {
        let (positions, triangles) = square();
        let positions = positions.into_iter().map(|p| p * 3.0).collect();
        let mesh =
            SurfaceMesh::from_triangles("sq", positions, &triangles, &SpectralConfig::metric_only())
                .unwrap()
                .normalised()
                .unwrap();
        assert_relative_eq!(mesh.geodesics().max(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_decimate_fraction_range() {
        let (positions, triangles) = square();
        let mesh =
            SurfaceMesh::from_triangles("sq", positions, &triangles, &SpectralConfig::metric_only())
                .unwrap();
        assert_eq!(mesh.decimate(0.5).unwrap().len(), 2);
        assert!(mesh.decimate(0.0).is_err());
        assert!(mesh.decimate(1.5).is_err());
        assert!(mesh.decimate(0.1).unwrap().is_empty());
    }
}
