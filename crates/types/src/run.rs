//! Run identity and per-tick snapshots

use crate::phase::{Phase, PhaseStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for one tracker run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new run ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only snapshot of a run, produced on every tick
///
/// Consumers must treat every field as immutable; the next tick delivers a
/// fresh snapshot rather than mutating a previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    /// Which run this snapshot belongs to
    pub run_id: RunId,
    /// The phase currently in its window, if any
    pub current_phase: Option<Phase>,
    /// Overall completion, 0..=100, non-decreasing across ticks
    pub overall_progress_percent: f64,
    /// Planned time left in the run
    pub time_remaining: Duration,
    /// Sum of all planned phase durations, fixed at run start
    pub total_planned_duration: Duration,
    /// All phases with their current status and progress
    pub phases: Vec<Phase>,
    /// How many phases have completed
    pub completed_phase_count: usize,
}

impl RunState {
    /// Category tag of the active phase, if any.
    #[must_use]
    pub fn current_category(&self) -> Option<&str> {
        self.current_phase.as_ref().map(|p| p.category.as_str())
    }

    /// Whether every phase has reached a terminal status.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phases.iter().all(|p| p.status.is_terminal())
    }

    /// Index of the active phase within `phases`, if any.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.phases.iter().position(|p| p.status == PhaseStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(id: &str, status: PhaseStatus) -> Phase {
        Phase {
            id: id.to_string(),
            display_name: id.to_string(),
            short_display_name: id.to_string(),
            description: String::new(),
            category: "data".to_string(),
            planned_duration: Duration::from_millis(1000),
            progress_percent: 0.0,
            status,
        }
    }

    #[test]
    fn test_run_id_uniqueness() {
        assert_ne!(RunId::new(), RunId::new());
    }

    #[test]
    fn test_finished_and_active_index() {
        let state = RunState {
            run_id: RunId::new(),
            current_phase: None,
            overall_progress_percent: 50.0,
            time_remaining: Duration::from_millis(1000),
            total_planned_duration: Duration::from_millis(2000),
            phases: vec![
                phase("a", PhaseStatus::Completed),
                phase("b", PhaseStatus::Active),
                phase("c", PhaseStatus::Pending),
            ],
            completed_phase_count: 1,
        };
        assert!(!state.is_finished());
        assert_eq!(state.active_index(), Some(1));
    }
}
