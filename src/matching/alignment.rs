//! Rigid alignment of matched vertices and the display hook.

use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

use crate::core::Assignment;
use crate::mesh::MeshMetric;

/// Receives each computed match for display.
///
/// Called after scoring with the rotation that aligns the destination onto
/// the source. Implementations only observe; nothing they do affects the
/// assignment or the distortion.
pub trait AlignmentViewer: Send + Sync {
    /// Show `dst` rotated by `rotation` next to `src`.
    fn show(
        &self,
        src: &dyn MeshMetric,
        dst: &dyn MeshMetric,
        assignment: &Assignment,
        rotation: &Rotation3<f64>,
    );
}

/// Rotation `R` minimizing `Σ ‖R (d − d̄) − (s − s̄)‖²` over matched points.
///
/// Kabsch: SVD of the cross-covariance, with the smallest singular
/// direction flipped if needed so `R` is a proper rotation. `None` when the
/// point sets differ in length or are empty.
pub fn orthogonal_procrustes(
    src: &[Point3<f64>],
    dst: &[Point3<f64>],
) -> Option<Rotation3<f64>> {
    let n = src.len();
    if n == 0 || dst.len() != n {
        return None;
    }

    let src_centroid: Vector3<f64> = src.iter().map(|p| p.coords).sum::<Vector3<f64>>() / n as f64;
    let dst_centroid: Vector3<f64> = dst.iter().map(|p| p.coords).sum::<Vector3<f64>>() / n as f64;

    let mut h = Matrix3::zeros();
    for (s, d) in src.iter().zip(dst) {
        h += (d.coords - dst_centroid) * (s.coords - src_centroid).transpose();
    }

    let svd = h.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;

    let mut rotation = v_t.transpose() * u.transpose();
    if rotation.determinant() < 0.0 {
        let mut v_t_fixed = v_t;
        v_t_fixed.set_row(2, &(-v_t.row(2)));
        rotation = v_t_fixed.transpose() * u.transpose();
    }
    Some(Rotation3::from_matrix_unchecked(rotation))
}

/// Procrustes rotation for the matched vertices of two meshes.
pub fn matched_rotation(
    src: &dyn MeshMetric,
    dst: &dyn MeshMetric,
    assignment: &Assignment,
) -> Option<Rotation3<f64>> {
    let src_points: Vec<Point3<f64>> = assignment.src().iter().map(|&i| src.positions()[i]).collect();
    let dst_points: Vec<Point3<f64>> = assignment.dst().iter().map(|&j| dst.positions()[j]).collect();
    orthogonal_procrustes(&src_points, &dst_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cloud() -> Vec<Point3<f64>> {
        vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
            Point3::new(1.0, 1.0, -1.0),
            Point3::new(-2.0, 0.5, 0.3),
        ]
    }

    #[test]
    fn test_recovers_rotation() {
        let src = cloud();
        let truth = Rotation3::from_euler_angles(0.3, -0.2, 1.1);
        // dst = truth⁻¹ src, so aligning dst onto src needs `truth`
        let dst: Vec<Point3<f64>> = src.iter().map(|p| truth.inverse() * p).collect();
        let rotation = orthogonal_procrustes(&src, &dst).unwrap();
        assert_relative_eq!(rotation, truth, epsilon = 1e-9);
    }

    #[test]
    fn test_never_reflects() {
        let src = cloud();
        let mirrored: Vec<Point3<f64>> = src.iter().map(|p| Point3::new(-p.x, p.y, p.z)).collect();
        let rotation = orthogonal_procrustes(&src, &mirrored).unwrap();
        assert_relative_eq!(rotation.matrix().determinant(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(orthogonal_procrustes(&cloud(), &cloud()[..2]).is_none());
        assert!(orthogonal_procrustes(&[], &[]).is_none());
    }
}
