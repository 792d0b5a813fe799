//! Phase catalog: the fixed, ordered table of phases a run is planned from
//!
//! The catalog is configuration, not computed state. A malformed catalog
//! (empty, duplicate ids, zero durations) is rejected at load time so the
//! planner can stay infallible.

use serde::{Deserialize, Serialize};
use splashtrack_errors::{ConfigError, Error};
use std::collections::HashSet;
use std::time::Duration;

/// One catalog entry: a phase before scaling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// Stable key, unique within the catalog
    pub id: String,
    /// Full display name
    pub display_name: String,
    /// Abbreviated name for narrow layouts
    pub short_name: String,
    /// Longer presentation blurb
    #[serde(default)]
    pub description: String,
    /// Free-form grouping tag
    pub category: String,
    /// Nominal duration before speed/device scaling
    pub nominal_ms: u64,
}

impl PhaseSpec {
    #[must_use]
    pub fn nominal(&self) -> Duration {
        Duration::from_millis(self.nominal_ms)
    }
}

/// A validated, ordered, non-empty phase catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCatalog(Vec<PhaseSpec>);

impl PhaseCatalog {
    /// Validate and wrap a list of phase specs.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, contains duplicate ids, or
    /// contains a zero nominal duration.
    pub fn new(specs: Vec<PhaseSpec>) -> Result<Self, Error> {
        if specs.is_empty() {
            return Err(ConfigError::EmptyCatalog.into());
        }

        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.id.as_str()) {
                return Err(ConfigError::DuplicatePhaseId {
                    id: spec.id.clone(),
                }
                .into());
            }
            if spec.nominal_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("phase.{}.nominal_ms", spec.id),
                    value: "0".to_string(),
                }
                .into());
            }
        }

        Ok(Self(specs))
    }

    /// The built-in seven-phase catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self(vec![
            PhaseSpec {
                id: "network-check".to_string(),
                display_name: "Detecting network speed & connection quality".to_string(),
                short_name: "Network check".to_string(),
                description: "Analyzing the connection for optimal pacing".to_string(),
                category: "network".to_string(),
                nominal_ms: 1000,
            },
            PhaseSpec {
                id: "asset-load".to_string(),
                display_name: "Loading application assets & resources".to_string(),
                short_name: "Loading assets".to_string(),
                description: "Fetching essential files and dependencies".to_string(),
                category: "assets".to_string(),
                nominal_ms: 1500,
            },
            PhaseSpec {
                id: "ui-init".to_string(),
                display_name: "Initializing user interface components".to_string(),
                short_name: "Init UI".to_string(),
                description: "Setting up the interface framework".to_string(),
                category: "ui".to_string(),
                nominal_ms: 1200,
            },
            PhaseSpec {
                id: "security-setup".to_string(),
                display_name: "Setting up security layer & encryption".to_string(),
                short_name: "Security setup".to_string(),
                description: "Establishing secure communication".to_string(),
                category: "security".to_string(),
                nominal_ms: 1800,
            },
            PhaseSpec {
                id: "network-connect".to_string(),
                display_name: "Connecting to payment network infrastructure".to_string(),
                short_name: "Connecting".to_string(),
                description: "Establishing the connection to backend services".to_string(),
                category: "blockchain".to_string(),
                nominal_ms: 2000,
            },
            PhaseSpec {
                id: "data-sync".to_string(),
                display_name: "Synchronizing data & preferences".to_string(),
                short_name: "Data sync".to_string(),
                description: "Loading settings and cached data".to_string(),
                category: "data".to_string(),
                nominal_ms: 1000,
            },
            PhaseSpec {
                id: "finalize".to_string(),
                display_name: "Optimizing performance & finalizing setup".to_string(),
                short_name: "Finalizing".to_string(),
                description: "Fine-tuning for the best experience".to_string(),
                category: "optimization".to_string(),
                nominal_ms: 800,
            },
        ])
    }

    /// Ordered phase specs.
    #[must_use]
    pub fn specs(&self) -> &[PhaseSpec] {
        &self.0
    }

    /// Sum of nominal durations before scaling.
    #[must_use]
    pub fn total_nominal(&self) -> Duration {
        Duration::from_millis(self.0.iter().map(|s| s.nominal_ms).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, nominal_ms: u64) -> PhaseSpec {
        PhaseSpec {
            id: id.to_string(),
            display_name: id.to_string(),
            short_name: id.to_string(),
            description: String::new(),
            category: "data".to_string(),
            nominal_ms,
        }
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = PhaseCatalog::builtin();
        assert_eq!(catalog.specs().len(), 7);
        assert_eq!(catalog.specs()[0].id, "network-check");
        assert_eq!(catalog.specs()[6].id, "finalize");
        assert_eq!(catalog.total_nominal(), Duration::from_millis(9300));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            PhaseCatalog::new(vec![]),
            Err(Error::Config(ConfigError::EmptyCatalog))
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = PhaseCatalog::new(vec![spec("a", 100), spec("a", 200)]);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::DuplicatePhaseId { .. }))
        ));
    }

    #[test]
    fn test_rejects_zero_duration() {
        let result = PhaseCatalog::new(vec![spec("a", 0)]);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));
    }
}
