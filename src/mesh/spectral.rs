//! Laplacian eigenbasis and heat kernel signatures.
//!
//! The graph Laplacian `L = D − W` uses inverse edge length weights. Its
//! smallest eigenpairs form the spectral basis; heat kernel signatures
//! (HKS) at log-spaced diffusion times form the descriptors.
//!
//! ```text
//! HKS(x, t) = Σ_k exp(−λ_k t) φ_k(x)²  /  Σ_k exp(−λ_k t)
//! t ∈ [4 ln 10 / λ_max, 4 ln 10 / λ_1]   (log-spaced)
//! ```

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use serde::{Deserialize, Serialize};

/// Spectral settings for [`SurfaceMesh`](super::SurfaceMesh).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Number of Laplacian eigenpairs to keep (0 skips the eigensolve)
    pub basis_size: usize,
    /// Number of heat kernel signature times
    pub descriptor_count: usize,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            basis_size: 60,
            descriptor_count: 16,
        }
    }
}

impl SpectralConfig {
    /// Geometry only: no basis, no descriptors.
    pub fn metric_only() -> Self {
        Self {
            basis_size: 0,
            descriptor_count: 0,
        }
    }
}

/// Spectral data of one mesh.
#[derive(Clone, Debug)]
pub struct SpectralData {
    /// Ascending eigenvalues (length `K`)
    pub eigenvalues: DVector<f64>,
    /// Eigenfunctions as columns (`N × K`)
    pub basis: DMatrix<f64>,
    /// Descriptor functions as columns (`N × d`)
    pub descriptors: DMatrix<f64>,
}

const MIN_EDGE_LENGTH: f64 = 1e-12;

impl SpectralData {
    /// Compute basis and descriptors from a weighted adjacency list.
    ///
    /// `config.basis_size` must not exceed the vertex count.
    pub fn compute(adjacency: &[Vec<(usize, f64)>], config: &SpectralConfig) -> Self {
        let n = adjacency.len();
        let k = config.basis_size.min(n);
        if k == 0 {
            return Self {
                eigenvalues: DVector::zeros(0),
                basis: DMatrix::zeros(n, 0),
                descriptors: DMatrix::zeros(n, 0),
            };
        }

        let laplacian = graph_laplacian(adjacency);
        let eigen = SymmetricEigen::new(laplacian);

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
        order.truncate(k);

        let eigenvalues = DVector::from_iterator(k, order.iter().map(|&i| eigen.eigenvalues[i].max(0.0)));
        let mut basis = DMatrix::zeros(n, k);
        for (col, &src) in order.iter().enumerate() {
            let mut v = eigen.eigenvectors.column(src).clone_owned();
            fix_sign(&mut v);
            basis.set_column(col, &v);
        }

        let descriptors = heat_kernel_signatures(&eigenvalues, &basis, config.descriptor_count);
        Self {
            eigenvalues,
            basis,
            descriptors,
        }
    }
}

fn graph_laplacian(adjacency: &[Vec<(usize, f64)>]) -> DMatrix<f64> {
    let n = adjacency.len();
    let mut laplacian = DMatrix::zeros(n, n);
    for (i, neighbours) in adjacency.iter().enumerate() {
        for &(j, length) in neighbours {
            if i == j {
                continue;
            }
            let w = 1.0 / length.max(MIN_EDGE_LENGTH);
            laplacian[(i, j)] -= w;
            laplacian[(i, i)] += w;
        }
    }
    // Symmetrize in case the adjacency list is not perfectly mirrored
    (&laplacian + laplacian.transpose()) * 0.5
}

/// Eigenvectors are defined up to sign; make the largest-magnitude entry
/// positive so identical inputs give identical bases.
fn fix_sign(v: &mut DVector<f64>) {
    let mut pivot = 0.0_f64;
    for &x in v.iter() {
        if x.abs() > pivot.abs() {
            pivot = x;
        }
    }
    if pivot < 0.0 {
        v.neg_mut();
    }
}

fn heat_kernel_signatures(
    eigenvalues: &DVector<f64>,
    basis: &DMatrix<f64>,
    count: usize,
) -> DMatrix<f64> {
    let n = basis.nrows();
    if count == 0 {
        return DMatrix::zeros(n, 0);
    }

    let lambda_max = eigenvalues.max();
    let lambda_min = eigenvalues
        .iter()
        .copied()
        .find(|&l| l > lambda_max * 1e-10 && l > 0.0);

    let times: Vec<f64> = match lambda_min {
        Some(lambda_min) if lambda_max > lambda_min => {
            let t_min = 4.0 * std::f64::consts::LN_10 / lambda_max;
            let t_max = 4.0 * std::f64::consts::LN_10 / lambda_min;
            log_space(t_min, t_max, count)
        }
        Some(lambda) => vec![4.0 * std::f64::consts::LN_10 / lambda; count],
        None => vec![1.0; count],
    };

    let squared = basis.map(|x| x * x);
    let mut descriptors = DMatrix::zeros(n, count);
    for (col, &t) in times.iter().enumerate() {
        let weights = eigenvalues.map(|l| (-l * t).exp());
        let trace = weights.sum();
        let hks = &squared * &weights / trace;
        descriptors.set_column(col, &hks);
    }
    descriptors
}

fn log_space(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![(start * end).sqrt()];
    }
    let (ls, le) = (start.ln(), end.ln());
    (0..count)
        .map(|i| (ls + (le - ls) * i as f64 / (count - 1) as f64).exp())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cycle(n: usize) -> Vec<Vec<(usize, f64)>> {
        (0..n)
            .map(|i| vec![((i + 1) % n, 1.0), ((i + n - 1) % n, 1.0)])
            .collect()
    }

    #[test]
    fn test_constant_first_eigenfunction() {
        let data = SpectralData::compute(
            &cycle(12),
            &SpectralConfig {
                basis_size: 5,
                descriptor_count: 3,
            },
        );
        assert_relative_eq!(data.eigenvalues[0], 0.0, epsilon = 1e-9);
        let first = data.basis.column(0);
        let expected = 1.0 / (12.0f64).sqrt();
        for &x in first.iter() {
            assert_relative_eq!(x, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_eigenvalues_ascending_and_orthonormal() {
        let data = SpectralData::compute(
            &cycle(10),
            &SpectralConfig {
                basis_size: 6,
                descriptor_count: 2,
            },
        );
        for w in data.eigenvalues.as_slice().windows(2) {
            assert!(w[0] <= w[1] + 1e-12);
        }
        let gram = data.basis.transpose() * &data.basis;
        assert_relative_eq!(gram, DMatrix::identity(6, 6), epsilon = 1e-9);
    }

    #[test]
    fn test_descriptor_shape() {
        let data = SpectralData::compute(
            &cycle(8),
            &SpectralConfig {
                basis_size: 4,
                descriptor_count: 7,
            },
        );
        assert_eq!(data.descriptors.shape(), (8, 7));
        assert!(data.descriptors.iter().all(|x| x.is_finite() && *x >= 0.0));
    }

    #[test]
    fn test_sign_follows_largest_entry() {
        let mut v = DVector::from_vec(vec![0.1, -0.9, 0.3]);
        fix_sign(&mut v);
        assert_eq!(v, DVector::from_vec(vec![-0.1, 0.9, -0.3]));
        fix_sign(&mut v);
        assert_eq!(v[1], 0.9);
    }

    #[test]
    fn test_metric_only() {
        let data = SpectralData::compute(&cycle(5), &SpectralConfig::metric_only());
        assert_eq!(data.basis.shape(), (5, 0));
        assert_eq!(data.descriptors.shape(), (5, 0));
    }

    #[test]
    fn test_log_space_endpoints() {
        let t = log_space(0.1, 10.0, 3);
        assert_relative_eq!(t[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(t[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(t[2], 10.0, epsilon = 1e-12);
    }
}
