#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the splashtrack progress tracker
//!
//! This crate provides the fundamental types shared across the system:
//! network quality samples, loading phases, and per-tick run snapshots.

pub mod network;
pub mod phase;
pub mod run;

// Re-export commonly used types
pub use network::{ConnectionKind, ConnectionQuality, NetworkQualitySample, SpeedTier};
pub use phase::{Phase, PhaseStatus};
pub use run::{RunId, RunState};
pub use uuid::Uuid;

use serde::{Deserialize, Serialize};

/// Device class used to scale phase durations uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Full-size device (desktop, laptop)
    Desktop,
    /// Compact device (phone, small tablet)
    Compact,
}

impl Default for DeviceClass {
    fn default() -> Self {
        Self::Desktop
    }
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Desktop => write!(f, "desktop"),
            Self::Compact => write!(f, "compact"),
        }
    }
}
