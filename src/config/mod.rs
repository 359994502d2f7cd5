//! Correspondence configuration.
//!
//! Loaded from YAML. The three keys the pipeline cannot guess are required;
//! everything else has a documented default.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use micro_match::config::CorrespondenceConfig;
//!
//! let config = CorrespondenceConfig::load(Path::new("parameters.yml"))?;
//! config.validate()?;
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`SolverSection`] | Commutativity weight and symmetry tie tolerance |
//! | [`ZoomoutSection`] | Maximum refined dimension and step |
//! | [`SoftCorrespondenceSection`] | Affinity kernel width |
//! | [`FilterConfig`] | Product manifold filter and assigner selection |
//!
//! ## Example YAML
//!
//! ```yaml
//! initial_solve_dimension: 20     # required
//! symmetry_optimisation: false    # required
//! product_manifold_filter:        # required
//!   iterations: 5
//!   feasibility_fraction: 0.05
//!   assigner: elastic             # optimal | elastic
//!   stretch: 10.0
//!
//! zoomout:
//!   max_dimension: 60
//! ```

mod correspondence;
mod defaults;
mod sections;

pub use correspondence::CorrespondenceConfig;
pub use sections::{
    AssignerKind, FilterConfig, SoftCorrespondenceSection, SolverSection, ZoomoutSection,
};
