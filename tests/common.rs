//! Test utilities for micro-match integration tests.
//!
//! Meshes are k-NN graphs over Fibonacci-sampled ellipsoids, so every
//! fixture is deterministic and connected.

#![allow(dead_code)]

use micro_match::{SpectralConfig, SurfaceMesh};
use nalgebra::Point3;

/// Neighbours per vertex in the k-NN graph.
pub const NEIGHBOURS: usize = 8;

/// Evenly spread points on an axis-aligned ellipsoid.
pub fn fibonacci_ellipsoid(n: usize, radii: [f64; 3]) -> Vec<Point3<f64>> {
    let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f64;
            Point3::new(
                radii[0] * r * theta.cos(),
                radii[1] * y,
                radii[2] * r * theta.sin(),
            )
        })
        .collect()
}

/// Spectral settings small enough for debug-build tests.
pub fn spectral(basis_size: usize) -> SpectralConfig {
    SpectralConfig {
        basis_size,
        descriptor_count: 16,
    }
}

/// Ellipsoid mesh with a spectral basis of 30 functions.
pub fn ellipsoid(name: &str, n: usize, radii: [f64; 3]) -> SurfaceMesh {
    SurfaceMesh::from_point_cloud(name, fibonacci_ellipsoid(n, radii), NEIGHBOURS, &spectral(30))
        .expect("ellipsoid mesh")
}

/// Ellipsoid mesh without basis or descriptors.
pub fn metric_only(name: &str, n: usize) -> SurfaceMesh {
    SurfaceMesh::from_point_cloud(
        name,
        fibonacci_ellipsoid(n, [1.0, 1.5, 0.8]),
        NEIGHBOURS,
        &SpectralConfig::metric_only(),
    )
    .expect("metric-only mesh")
}

/// Initialize logging once; repeated calls are harmless.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
