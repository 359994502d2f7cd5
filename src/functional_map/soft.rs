//! Soft correspondence from a functional map.

use nalgebra::DMatrix;

use super::truncated_basis;
use crate::core::linalg::pairwise_squared_distances;
use crate::error::NumericalError;
use crate::mesh::MeshMetric;

/// Dense affinity `P` (`N_src × N_dst`) between vertices.
///
/// With `emb_src = Φs Cᵀ` and `emb_dst = Φd` over the map's dimension,
///
/// ```text
/// P[x, y] = exp(−‖emb_src[x] − emb_dst[y]‖² / (w · mean d²))
/// ```
///
/// Larger means more similar; every entry lies in `(0, 1]`.
pub fn soft_correspondence(
    src: &dyn MeshMetric,
    dst: &dyn MeshMetric,
    c: &DMatrix<f64>,
    kernel_width: f64,
) -> Result<DMatrix<f64>, NumericalError> {
    if c.nrows() != c.ncols() {
        return Err(NumericalError::DimensionMismatch {
            context: "soft correspondence map",
            expected: c.nrows(),
            actual: c.ncols(),
        });
    }
    let k = c.nrows();
    let emb_src = truncated_basis(src, k)? * c.transpose();
    let emb_dst = truncated_basis(dst, k)?;

    let d2 = pairwise_squared_distances(&emb_src, &emb_dst)?;
    let scale = kernel_width * d2.mean();
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(NumericalError::DegenerateNormalization("soft correspondence"));
    }
    Ok(d2.map(|d| (-d / scale).exp()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{SpectralConfig, SurfaceMesh};
    use nalgebra::Point3;

    fn path(n: usize) -> SurfaceMesh {
        let positions = (0..n)
            .map(|i| Point3::new(i as f64, (i * i) as f64 * 0.01, 0.0))
            .collect();
        let edges: Vec<(usize, usize)> = (1..n).map(|i| (i - 1, i)).collect();
        let spectral = SpectralConfig {
            basis_size: 4,
            descriptor_count: 2,
        };
        SurfaceMesh::from_edges("path", positions, &edges, &spectral).unwrap()
    }

    #[test]
    fn test_self_affinity_peaks_on_diagonal() {
        let mesh = path(10);
        let p = soft_correspondence(&mesh, &mesh, &DMatrix::identity(4, 4), 0.1).unwrap();
        assert_eq!(p.shape(), (10, 10));
        for x in 0..10 {
            assert_eq!(p[(x, x)], 1.0);
            for y in 0..10 {
                assert!(p[(x, y)] > 0.0 && p[(x, y)] <= 1.0);
                if y != x {
                    assert!(p[(x, y)] < 1.0);
                }
            }
        }
    }

    #[test]
    fn test_zero_width_is_degenerate() {
        let mesh = path(10);
        let result = soft_correspondence(&mesh, &mesh, &DMatrix::identity(2, 2), 0.0);
        assert!(matches!(
            result,
            Err(NumericalError::DegenerateNormalization(_))
        ));
    }

    #[test]
    fn test_dimension_exceeds_basis() {
        let mesh = path(10);
        let result = soft_correspondence(&mesh, &mesh, &DMatrix::identity(5, 5), 0.1);
        assert!(matches!(
            result,
            Err(NumericalError::DimensionExceedsBasis { .. })
        ));
    }
}
