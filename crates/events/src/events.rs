//! Domain events emitted across a tracker run
//!
//! One enum covers the full pipeline: network detection, planning, and the
//! clock's run lifecycle. Struct variants carry the data a consumer needs
//! to render or log the event without reaching back into the emitter.

use crate::meta::{EventLevel, EventSource};
use serde::{Deserialize, Serialize};
use splashtrack_types::{NetworkQualitySample, RunId, RunState, SpeedTier};
use std::time::Duration;

/// Events emitted by the estimator, planner, and progress clock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// A detection cycle started issuing probes
    DetectionStarted { probe_count: usize },

    /// One probe returned successfully
    ProbeCompleted { url: String, latency_ms: f64 },

    /// One probe failed and was discarded
    ProbeFailed { url: String, error: String },

    /// A detection cycle produced a measured sample
    DetectionCompleted { sample: NetworkQualitySample },

    /// Every probe failed; the fixed fallback sample was used
    DetectionFellBack { reason: String },

    /// The planner produced a phase list
    PlanReady {
        tier: SpeedTier,
        phase_count: usize,
        total_planned: Duration,
    },

    /// A run started ticking
    RunStarted {
        run_id: RunId,
        phase_count: usize,
        total_planned: Duration,
    },

    /// Per-tick snapshot of the run
    Tick { state: RunState },

    /// A phase entered its time window
    PhaseStarted {
        run_id: RunId,
        phase_id: String,
        display_name: String,
    },

    /// A phase ran its window to completion
    PhaseCompleted { run_id: RunId, phase_id: String },

    /// The run reached 100% and settled
    RunCompleted { run_id: RunId, elapsed: Duration },

    /// The run was cancelled before completing
    RunCancelled { run_id: RunId },
}

impl TrackerEvent {
    /// Severity for log routing.
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Tick { .. } => EventLevel::Trace,
            Self::DetectionStarted { .. }
            | Self::ProbeCompleted { .. }
            | Self::PhaseStarted { .. }
            | Self::PhaseCompleted { .. } => EventLevel::Debug,
            Self::ProbeFailed { .. } | Self::DetectionFellBack { .. } => EventLevel::Warn,
            Self::DetectionCompleted { .. }
            | Self::PlanReady { .. }
            | Self::RunStarted { .. }
            | Self::RunCompleted { .. }
            | Self::RunCancelled { .. } => EventLevel::Info,
        }
    }

    /// Which subsystem emits this event.
    #[must_use]
    pub fn source(&self) -> EventSource {
        match self {
            Self::DetectionStarted { .. }
            | Self::ProbeCompleted { .. }
            | Self::ProbeFailed { .. }
            | Self::DetectionCompleted { .. }
            | Self::DetectionFellBack { .. } => EventSource::ESTIMATOR,
            Self::PlanReady { .. } => EventSource::PLANNER,
            Self::RunStarted { .. }
            | Self::Tick { .. }
            | Self::PhaseStarted { .. }
            | Self::PhaseCompleted { .. }
            | Self::RunCompleted { .. }
            | Self::RunCancelled { .. } => EventSource::CLOCK,
        }
    }
}
