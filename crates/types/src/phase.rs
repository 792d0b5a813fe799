//! Loading phase types
//!
//! Phases are constructed once per run by the planner and only their
//! `progress_percent` and `status` fields mutate afterwards, driven by the
//! progress clock. Statuses advance strictly pending -> active ->
//! completed; `Error` is a terminal alternative to completed that the
//! simulated clock never assigns on its own.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle status of a single phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    /// Not yet reached
    Pending,
    /// Currently in its time window
    Active,
    /// Time window fully elapsed
    Completed,
    /// Terminal failure, reserved for real-operation bindings
    Error,
}

impl PhaseStatus {
    /// Whether this status is terminal for the phase.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One named, timed segment of a loading sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Stable key, unique within a run
    pub id: String,
    /// Full display name
    pub display_name: String,
    /// Abbreviated name for narrow layouts
    pub short_display_name: String,
    /// Longer presentation blurb, opaque to the core
    pub description: String,
    /// Free-form grouping tag, opaque to the core
    pub category: String,
    /// Scheduled duration, fixed once the run starts
    pub planned_duration: Duration,
    /// Completion within this phase, 0..=100
    pub progress_percent: f64,
    /// Current lifecycle status
    pub status: PhaseStatus,
}

impl Phase {
    /// Whether the phase has fully run its window.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == PhaseStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(!PhaseStatus::Pending.is_terminal());
        assert!(!PhaseStatus::Active.is_terminal());
        assert!(PhaseStatus::Completed.is_terminal());
        assert!(PhaseStatus::Error.is_terminal());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&PhaseStatus::Active).unwrap(),
            "\"active\""
        );
    }
}
