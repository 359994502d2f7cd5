//! Core types and numerical helpers shared by every stage.
//!
//! - [`Assignment`]: partial injective vertex mapping (`i`, `j` index pairs)
//! - [`PairKey`]: canonical (source, destination) mesh pair
//! - [`linalg`]: least squares and nearest-neighbour search on dense matrices
//! - [`CancelToken`]: cooperative cancellation checked once per iteration

mod cancel;
pub mod linalg;
mod types;

pub use cancel::CancelToken;
pub use types::{Assignment, PairKey};
