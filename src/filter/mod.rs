//! Product manifold filtering of discrete assignments.

mod product_manifold;

pub use product_manifold::{FilterOutcome, ProductManifoldFilter, consistency_affinity};
