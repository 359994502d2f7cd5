//! # micro-match
//!
//! Dense vertex correspondence between surface meshes.
//!
//! ## Overview
//!
//! Given two meshes, each described by a geodesic distance matrix, a
//! Laplacian eigenbasis and per-vertex descriptors, micro-match computes a
//! partial injective vertex mapping and scores it by geodesic distortion.
//!
//! ```text
//! descriptors ──▶ functional map (k × k) ──▶ zoomout ──▶ soft correspondence
//!                                                               │
//!           assignment ◀── product manifold filter ◀── assigner ┘
//!                │
//!                └──▶ geodesic distortion, cache, viewer
//! ```
//!
//! ## Features
//!
//! - **Functional maps**: regularized least squares with an optional
//!   reflected candidate for bilaterally symmetric shapes
//! - **Zoomout**: spectral upsampling of the initial map
//! - **Assignment**: optimal (one-to-one) and elastic (cluster-capacity)
//!   assigners on feasibility-masked affinities
//! - **Product manifold filter**: iterative geodesic-consistency refinement
//! - **Caching**: NumPy-compatible `.npy` assignments on disk
//! - **Batch matching**: parallel pairs collected into a distortion table
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use micro_match::{CorrespondenceConfig, DiskStore, Matcher, MeshLibrary};
//!
//! let config = CorrespondenceConfig::load(Path::new("parameters.yml"))?;
//! let matcher = Matcher::new(Arc::new(library), config)?
//!     .with_store(Arc::new(DiskStore::new("assignments")?));
//!
//! let outcome = matcher.match_pair("Q01", "Q02")?;
//! println!("{} -> {}: {:.3}", outcome.source, outcome.destination, outcome.distortion);
//! ```
//!
//! ## Conventions
//!
//! - The mesh with fewer vertices is always the source
//! - Assignments map source vertex `i[n]` to destination vertex `j[n]`
//! - Functional maps carry source spectral coefficients to destination ones

#![warn(missing_docs)]

// Core types
pub mod core;

// Errors for every stage
pub mod error;

// YAML configuration
pub mod config;

// Mesh contract and reference implementation
pub mod mesh;

// Spectral map estimation and refinement
pub mod functional_map;

// Masked assignment solvers
pub mod assignment;

// Product manifold filter
pub mod filter;

// Assignment cache
pub mod store;

// Pair orchestration, scoring and batches
pub mod matching;

// Re-export commonly used types
pub use self::core::{Assignment, CancelToken, PairKey};

pub use error::{ConfigError, Error, MeshError, NumericalError, Result, StoreError};

pub use config::{AssignerKind, CorrespondenceConfig, FilterConfig};

pub use mesh::{MeshLibrary, MeshMetric, MeshSource, SpectralConfig, SurfaceMesh};

pub use functional_map::{FunctionalMap, FunctionalMapSolver, ZoomoutRefiner};

pub use assignment::{Assigner, ElasticAssigner, FeasibilityMask, OptimalAssigner};

pub use filter::ProductManifoldFilter;

pub use store::{AssignmentStore, DiskStore, MemoryStore};

pub use matching::{
    AlignmentViewer, DistortionTable, MatchOutcome, Matcher, compute_correspondence,
    geodesic_distortion,
};
