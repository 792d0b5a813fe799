//! Network quality sample types
//!
//! A [`NetworkQualitySample`] is produced once per detection cycle and is
//! immutable afterwards. Tier and quality are derived deterministically from
//! measured latency; throughput is a presentation-only pseudo-estimate and
//! must not drive control decisions beyond tier selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latency below this is classified as fast (milliseconds)
pub const FAST_LATENCY_CEILING_MS: f64 = 80.0;

/// Latency below this (and at/above the fast ceiling) is medium
pub const MEDIUM_LATENCY_CEILING_MS: f64 = 200.0;

/// Slow connections above this latency are classified as poor quality
pub const POOR_QUALITY_FLOOR_MS: f64 = 500.0;

/// Qualitative connection speed bucket derived from measured latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    Slow,
    Medium,
    Fast,
}

impl SpeedTier {
    /// Classify an average probe latency into a tier.
    #[must_use]
    pub fn from_latency_ms(latency_ms: f64) -> Self {
        if latency_ms < FAST_LATENCY_CEILING_MS {
            Self::Fast
        } else if latency_ms < MEDIUM_LATENCY_CEILING_MS {
            Self::Medium
        } else {
            Self::Slow
        }
    }
}

impl std::fmt::Display for SpeedTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slow => write!(f, "slow"),
            Self::Medium => write!(f, "medium"),
            Self::Fast => write!(f, "fast"),
        }
    }
}

// Implement clap::ValueEnum for SpeedTier so the CLI can accept overrides
impl clap::ValueEnum for SpeedTier {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Slow, Self::Medium, Self::Fast]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Slow => clap::builder::PossibleValue::new("slow"),
            Self::Medium => clap::builder::PossibleValue::new("medium"),
            Self::Fast => clap::builder::PossibleValue::new("fast"),
        })
    }
}

/// Qualitative connection quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    Poor,
    Good,
    Excellent,
}

impl ConnectionQuality {
    /// Derive quality from a tier and the latency that produced it.
    ///
    /// Fast connections are excellent, medium are good; slow connections
    /// are poor only past the poor-quality latency floor.
    #[must_use]
    pub fn from_tier_and_latency(tier: SpeedTier, latency_ms: f64) -> Self {
        match tier {
            SpeedTier::Fast => Self::Excellent,
            SpeedTier::Medium => Self::Good,
            SpeedTier::Slow => {
                if latency_ms > POOR_QUALITY_FLOOR_MS {
                    Self::Poor
                } else {
                    Self::Good
                }
            }
        }
    }
}

impl std::fmt::Display for ConnectionQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poor => write!(f, "poor"),
            Self::Good => write!(f, "good"),
            Self::Excellent => write!(f, "excellent"),
        }
    }
}

/// Physical connection type, when it can be determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Wifi,
    Ethernet,
    Cellular,
    #[default]
    Unknown,
}

impl std::fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wifi => write!(f, "wifi"),
            Self::Ethernet => write!(f, "ethernet"),
            Self::Cellular => write!(f, "cellular"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One network quality measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkQualitySample {
    /// Speed bucket derived from latency
    pub tier: SpeedTier,
    /// Heuristic throughput estimate, presentation only
    pub estimated_throughput_mbps: f64,
    /// Average measured round-trip latency across successful probes
    pub latency_ms: f64,
    /// Qualitative connection quality
    pub quality: ConnectionQuality,
    /// Physical connection type if known
    pub kind: ConnectionKind,
    /// When this sample was captured
    pub captured_at: DateTime<Utc>,
}

impl NetworkQualitySample {
    /// Throughput reported by the fallback sample (Mbps)
    pub const FALLBACK_THROUGHPUT_MBPS: f64 = 25.0;
    /// Latency reported by the fallback sample (milliseconds)
    pub const FALLBACK_LATENCY_MS: f64 = 150.0;

    /// Build a sample from a measured latency.
    ///
    /// Tier and quality are derived from the latency; throughput and
    /// connection kind are supplied by the caller.
    #[must_use]
    pub fn from_latency(latency_ms: f64, estimated_throughput_mbps: f64, kind: ConnectionKind) -> Self {
        let tier = SpeedTier::from_latency_ms(latency_ms);
        Self {
            tier,
            estimated_throughput_mbps,
            latency_ms,
            quality: ConnectionQuality::from_tier_and_latency(tier, latency_ms),
            kind,
            captured_at: Utc::now(),
        }
    }

    /// The fixed fallback sample used when every probe fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            tier: SpeedTier::Medium,
            estimated_throughput_mbps: Self::FALLBACK_THROUGHPUT_MBPS,
            latency_ms: Self::FALLBACK_LATENCY_MS,
            quality: ConnectionQuality::Good,
            kind: ConnectionKind::Unknown,
            captured_at: Utc::now(),
        }
    }

    /// Synthesize a sample for a caller-forced tier, without measuring.
    ///
    /// Used when a speed override is configured; latency and throughput are
    /// representative values for the tier.
    #[must_use]
    pub fn assumed(tier: SpeedTier) -> Self {
        let (latency_ms, estimated_throughput_mbps) = match tier {
            SpeedTier::Fast => (50.0, 70.0),
            SpeedTier::Medium => (150.0, 25.0),
            SpeedTier::Slow => (300.0, 8.0),
        };
        Self {
            tier,
            estimated_throughput_mbps,
            latency_ms,
            quality: ConnectionQuality::from_tier_and_latency(tier, latency_ms),
            kind: ConnectionKind::Unknown,
            captured_at: Utc::now(),
        }
    }
}
