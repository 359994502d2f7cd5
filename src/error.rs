//! Error types for micro-match.
//!
//! Errors are grouped by where they originate:
//!
//! | Type | Raised by |
//! |------|-----------|
//! | [`ConfigError`] | configuration parsing and validation, before any computation |
//! | [`NumericalError`] | spectral solver, zoomout, soft correspondence, assignment |
//! | [`MeshError`] | mesh construction and the mesh source |
//! | [`StoreError`] | assignment cache reads and writes |
//!
//! Infeasible rows in an assignment problem are not errors: they simply stay
//! unassigned and the caller sees a shorter [`Assignment`](crate::Assignment).

use crate::core::PairKey;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading the config file
    #[error("IO error: {0}")]
    Io(String),

    /// YAML parse error (includes missing required keys)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value is outside its valid range
    #[error("Invalid value for `{field}`: {reason}")]
    OutOfRange {
        /// Dotted path of the offending field
        field: &'static str,
        /// What the valid range is
        reason: String,
    },

    /// The elastic assigner's stretch leaves no representative vertex
    #[error("Stretch {stretch} leaves no representative among {vertices} vertices")]
    EmptyDecimation {
        /// Configured stretch ratio
        stretch: f64,
        /// Vertex count of the decimated mesh
        vertices: usize,
    },
}

/// Numerical errors from the correspondence pipeline.
///
/// These are deterministic in their inputs and never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumericalError {
    /// Requested spectral dimension exceeds the available basis
    #[error("Spectral dimension {requested} exceeds basis size {available}")]
    DimensionExceedsBasis {
        /// Requested dimension
        requested: usize,
        /// Basis functions available
        available: usize,
    },

    /// No descriptor functions available
    #[error("Descriptor set is empty")]
    EmptyDescriptors,

    /// Matrix shapes do not agree
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Operation that detected the mismatch
        context: &'static str,
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// A least-squares system is rank deficient
    #[error("Singular system in {0}")]
    Singular(&'static str),

    /// A normalization constant is zero
    #[error("Degenerate normalization in {0}")]
    DegenerateNormalization(&'static str),

    /// Distortion of an assignment with no pairs
    #[error("Assignment is empty")]
    EmptyAssignment,
}

/// Mesh construction and loading errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// No mesh with that name
    #[error("Mesh not found: {0}")]
    NotFound(String),

    /// Mesh has no vertices
    #[error("Mesh `{0}` has no vertices")]
    Empty(String),

    /// Edge or face references a missing vertex
    #[error("Mesh `{mesh}` references vertex {index} but has {count} vertices")]
    InvalidIndex {
        /// Mesh name
        mesh: String,
        /// Offending index
        index: usize,
        /// Number of vertices
        count: usize,
    },

    /// Edge graph is not connected, geodesics undefined
    #[error("Mesh `{0}` is not connected")]
    Disconnected(String),

    /// Spectral basis larger than the vertex count
    #[error("Mesh `{mesh}` cannot provide {requested} basis functions from {vertices} vertices")]
    BasisTooLarge {
        /// Mesh name
        mesh: String,
        /// Requested basis size
        requested: usize,
        /// Number of vertices
        vertices: usize,
    },

    /// Decimation fraction outside (0, 1]
    #[error("Decimation fraction {0} outside (0, 1]")]
    InvalidFraction(f64),
}

/// Assignment cache errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry exists but cannot be decoded
    #[error("Malformed entry {path}: {reason}")]
    Malformed {
        /// Entry location
        path: String,
        /// Decoding failure
        reason: String,
    },
}

/// micro-match error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Numerical error
    #[error("Numerical error: {0}")]
    Numerical(#[from] NumericalError),

    /// Mesh error
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Cooperative cancellation was requested
    #[error("Cancelled")]
    Cancelled,

    /// Error while matching a specific pair
    #[error("{pair}: {source}")]
    Pair {
        /// Canonical pair being matched
        pair: PairKey,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach mesh-pair context (idempotent).
    pub fn for_pair(self, pair: &PairKey) -> Self {
        match self {
            Error::Pair { .. } => self,
            other => Error::Pair {
                pair: pair.clone(),
                source: Box::new(other),
            },
        }
    }

    /// Innermost error, with pair context stripped.
    pub fn root(&self) -> &Error {
        match self {
            Error::Pair { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_context_display() {
        let pair = PairKey::new("Q02", "Q03");
        let err = Error::from(NumericalError::EmptyDescriptors).for_pair(&pair);
        assert_eq!(
            err.to_string(),
            "Q02 -> Q03: Numerical error: Descriptor set is empty"
        );
    }

    #[test]
    fn test_pair_context_not_nested() {
        let pair = PairKey::new("a", "b");
        let err = Error::Cancelled.for_pair(&pair).for_pair(&PairKey::new("c", "d"));
        assert!(err.to_string().starts_with("a -> b"));
        assert!(matches!(err.root(), Error::Cancelled));
    }
}
