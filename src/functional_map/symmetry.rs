//! Reflected candidate for intrinsic symmetry.
//!
//! Spectral descriptors cannot tell a shape from its mirror image, so the
//! solver also tries source descriptors permuted by a mirror of the source
//! across its bilateral plane.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Matrix3, Point3, SymmetricEigen, Unit, Vector3};

/// Mirror plane through a point with a unit normal.
#[derive(Clone, Debug, PartialEq)]
pub struct ReflectionPlane {
    /// Point on the plane
    pub origin: Point3<f64>,
    /// Unit normal
    pub normal: Unit<Vector3<f64>>,
}

impl ReflectionPlane {
    /// Plane through the centroid orthogonal to the second principal axis.
    ///
    /// For an elongated, bilaterally symmetric shape the first axis runs
    /// along the body and the third through its thickness, leaving the
    /// second as the left/right direction. `None` for fewer than two points.
    pub fn bilateral(positions: &[Point3<f64>]) -> Option<Self> {
        if positions.len() < 2 {
            return None;
        }
        let centroid: Vector3<f64> =
            positions.iter().map(|p| p.coords).sum::<Vector3<f64>>() / positions.len() as f64;

        let mut covariance = Matrix3::zeros();
        for p in positions {
            let d = p.coords - centroid;
            covariance += d * d.transpose();
        }

        let eigen = SymmetricEigen::new(covariance);
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
        let axis: Vector3<f64> = eigen.eigenvectors.column(order[1]).into_owned();

        Some(Self {
            origin: Point3::from(centroid),
            normal: Unit::try_new(axis, 1e-12)?,
        })
    }

    /// Mirror image of a point.
    pub fn reflect(&self, p: &Point3<f64>) -> Point3<f64> {
        let offset = self.normal.dot(&(p - self.origin));
        p - self.normal.into_inner() * (2.0 * offset)
    }
}

/// For each vertex, the vertex nearest to its mirror image.
pub fn reflection_permutation(positions: &[Point3<f64>], plane: &ReflectionPlane) -> Vec<usize> {
    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (i, p) in positions.iter().enumerate() {
        tree.add(&[p.x, p.y, p.z], i as u64);
    }

    positions
        .iter()
        .map(|p| {
            let q = plane.reflect(p);
            tree.nearest_one::<SquaredEuclidean>(&[q.x, q.y, q.z]).item as usize
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Ladder long in y, symmetric in x, thin in z.
    fn ladder() -> Vec<Point3<f64>> {
        let mut points = Vec::new();
        for i in 0..10 {
            let x = 0.3 + 0.05 * i as f64;
            let y = i as f64;
            let z = 0.01 * i as f64;
            points.push(Point3::new(x, y, z));
            points.push(Point3::new(-x, y, z));
        }
        points
    }

    #[test]
    fn test_bilateral_normal_is_left_right() {
        let plane = ReflectionPlane::bilateral(&ladder()).unwrap();
        assert_relative_eq!(plane.normal.x.abs(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(plane.origin.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_permutation_swaps_sides() {
        let points = ladder();
        let plane = ReflectionPlane::bilateral(&points).unwrap();
        let permutation = reflection_permutation(&points, &plane);
        for (i, &j) in permutation.iter().enumerate() {
            assert_eq!(j, i ^ 1);
        }
    }

    #[test]
    fn test_reflect_twice_is_identity() {
        let plane = ReflectionPlane {
            origin: Point3::new(1.0, 2.0, 3.0),
            normal: Unit::new_normalize(Vector3::new(1.0, 1.0, 0.0)),
        };
        let p = Point3::new(0.5, -2.0, 4.0);
        assert_relative_eq!(plane.reflect(&plane.reflect(&p)), p, epsilon = 1e-12);
    }

    #[test]
    fn test_single_point_has_no_plane() {
        assert!(ReflectionPlane::bilateral(&[Point3::origin()]).is_none());
    }
}
