//! Match orchestration.
//!
//! ## Flow
//!
//! ```text
//! (a, b) ──▶ load meshes ──▶ canonical order (smaller = source)
//!                                   │
//!                      store hit? ──┼── no ──▶ compute_correspondence ──┐
//!                           │ yes                                       │
//!                           ▼                                           ▼
//!                     stored assignment ──▶ geodesic distortion ◀── new assignment
//!                                                  │                    │
//!                                     viewer (optional)          save (if store)
//! ```
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`Matcher`] | Orchestrates one pair or a parallel batch |
//! | [`compute_correspondence`] | Solver → zoomout → soft correspondence → filter |
//! | [`geodesic_distortion`] | Quality score of an assignment |
//! | [`orthogonal_procrustes`] | Rigid rotation for display |
//! | [`DistortionTable`] | Batch results by first and second mesh |

mod alignment;
mod batch;
mod distortion;
mod orchestrator;

pub use alignment::{AlignmentViewer, matched_rotation, orthogonal_procrustes};
pub use batch::{DistortionEntry, DistortionTable};
pub use distortion::geodesic_distortion;
pub use orchestrator::{MatchOutcome, Matcher, compute_correspondence};
