//! Top-level correspondence configuration and loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::sections::{FilterConfig, SoftCorrespondenceSection, SolverSection, ZoomoutSection};
use crate::error::ConfigError;

/// Full correspondence configuration.
///
/// There is no `Default`: the initial solve dimension, the symmetry flag and
/// the filter section must be given explicitly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrespondenceConfig {
    /// Initial functional map dimension `k`
    pub initial_solve_dimension: usize,

    /// Evaluate a reflected candidate to resolve bilateral symmetry
    pub symmetry_optimisation: bool,

    /// Product manifold filter settings
    pub product_manifold_filter: FilterConfig,

    /// Solver regularization
    #[serde(default)]
    pub solver: SolverSection,

    /// Zoomout refinement
    #[serde(default)]
    pub zoomout: ZoomoutSection,

    /// Soft correspondence kernel
    #[serde(default)]
    pub soft_correspondence: SoftCorrespondenceSection,
}

impl CorrespondenceConfig {
    /// Create a config with default optional sections.
    pub fn new(
        initial_solve_dimension: usize,
        symmetry_optimisation: bool,
        product_manifold_filter: FilterConfig,
    ) -> Self {
        Self {
            initial_solve_dimension,
            symmetry_optimisation,
            product_manifold_filter,
            solver: SolverSection::default(),
            zoomout: ZoomoutSection::default(),
            soft_correspondence: SoftCorrespondenceSection::default(),
        }
    }

    /// Load and validate configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is within range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_solve_dimension == 0 {
            return Err(ConfigError::OutOfRange {
                field: "initial_solve_dimension",
                reason: "must be at least 1".to_string(),
            });
        }
        self.solver.validate()?;
        self.zoomout.validate()?;
        self.soft_correspondence.validate()?;
        self.product_manifold_filter.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssignerKind;

    const MINIMAL: &str = "
initial_solve_dimension: 20
symmetry_optimisation: false
product_manifold_filter:
  iterations: 4
  feasibility_fraction: 0.05
  assigner: elastic
  stretch: 10
";

    #[test]
    fn test_minimal_yaml() {
        let config = CorrespondenceConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.initial_solve_dimension, 20);
        assert!(!config.symmetry_optimisation);
        assert_eq!(config.product_manifold_filter.assigner, AssignerKind::Elastic);
        assert_eq!(config.product_manifold_filter.stretch, Some(10.0));
        assert_eq!(config.zoomout.max_dimension, 60);
        assert_eq!(config.zoomout.step, 1);
    }

    #[test]
    fn test_missing_required_key() {
        let yaml = "
symmetry_optimisation: true
product_manifold_filter:
  iterations: 4
  feasibility_fraction: 0.05
  assigner: optimal
";
        match CorrespondenceConfig::from_yaml(yaml) {
            Err(ConfigError::Parse(msg)) => assert!(msg.contains("initial_solve_dimension")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let yaml = MINIMAL.replace("initial_solve_dimension: 20", "initial_solve_dimension: 0");
        assert!(matches!(
            CorrespondenceConfig::from_yaml(&yaml),
            Err(ConfigError::OutOfRange {
                field: "initial_solve_dimension",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_assigner_rejected() {
        let yaml = MINIMAL.replace("assigner: elastic", "assigner: greedy");
        assert!(matches!(
            CorrespondenceConfig::from_yaml(&yaml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = CorrespondenceConfig::from_yaml(MINIMAL).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = CorrespondenceConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.initial_solve_dimension, config.initial_solve_dimension);
        assert_eq!(
            parsed.product_manifold_filter.stretch,
            config.product_manifold_filter.stretch
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = CorrespondenceConfig::load(Path::new("/nonexistent/parameters.yml"));
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }
}
