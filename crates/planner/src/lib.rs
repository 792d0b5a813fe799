#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Phase duration planner
//!
//! Turns the fixed phase catalog into the ordered phase list for one run:
//! nominal durations are scaled by the measured speed tier and the device
//! class, then optionally stretched so the total meets a minimum floor.
//! The planner is a pure function of its inputs; a malformed catalog is
//! rejected at config load, so nothing here can fail at runtime.

use splashtrack_config::{PhaseCatalog, PlannerConfig};
use splashtrack_types::{DeviceClass, NetworkQualitySample, Phase, PhaseStatus};
use std::time::Duration;
use tracing::debug;

/// Build the ordered phase list for one run.
///
/// Durations are `nominal * speed_multiplier * device_multiplier`, rounded
/// to whole milliseconds and never below 1ms. When the configured minimum
/// total exceeds the scaled sum, the shortfall is split evenly across
/// phases with the remainder assigned to the final phase, so the sum meets
/// the floor exactly.
#[must_use]
pub fn plan(
    catalog: &PhaseCatalog,
    config: &PlannerConfig,
    sample: &NetworkQualitySample,
    device: DeviceClass,
) -> Vec<Phase> {
    let speed_multiplier = config.speed_multiplier(sample.tier);
    let device_multiplier = config.device_multiplier(device);

    let mut phases: Vec<Phase> = catalog
        .specs()
        .iter()
        .map(|spec| {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let scaled_ms =
                ((spec.nominal_ms as f64) * speed_multiplier * device_multiplier).round() as u64;
            Phase {
                id: spec.id.clone(),
                display_name: spec.display_name.clone(),
                short_display_name: spec.short_name.clone(),
                description: spec.description.clone(),
                category: spec.category.clone(),
                planned_duration: Duration::from_millis(scaled_ms.max(1)),
                progress_percent: 0.0,
                status: PhaseStatus::Pending,
            }
        })
        .collect();

    if let Some(floor) = config.minimum_total() {
        stretch_to_floor(&mut phases, floor);
    }

    debug!(
        tier = %sample.tier,
        device = %device,
        phase_count = phases.len(),
        total_ms = total_ms(&phases),
        "planned phase list"
    );

    phases
}

/// Distribute the shortfall below `floor` across phases, remainder last.
fn stretch_to_floor(phases: &mut [Phase], floor: Duration) {
    let total = total_ms(phases);
    let floor_ms = u64::try_from(floor.as_millis()).unwrap_or(u64::MAX);
    if total >= floor_ms {
        return;
    }

    let shortfall = floor_ms - total;
    let count = phases.len() as u64;
    let per_phase = shortfall / count;
    let remainder = shortfall % count;

    for phase in phases.iter_mut() {
        phase.planned_duration += Duration::from_millis(per_phase);
    }
    if let Some(last) = phases.last_mut() {
        last.planned_duration += Duration::from_millis(remainder);
    }
}

fn total_ms(phases: &[Phase]) -> u64 {
    phases
        .iter()
        .map(|p| u64::try_from(p.planned_duration.as_millis()).unwrap_or(u64::MAX))
        .sum()
}

#[cfg(test)]
#[allow(
    clippy::float_cmp,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use splashtrack_config::PhaseSpec;
    use splashtrack_types::SpeedTier;

    fn catalog(durations: &[u64]) -> PhaseCatalog {
        let specs = durations
            .iter()
            .enumerate()
            .map(|(i, &nominal_ms)| PhaseSpec {
                id: format!("phase-{i}"),
                display_name: format!("Phase {i}"),
                short_name: format!("P{i}"),
                description: String::new(),
                category: "data".to_string(),
                nominal_ms,
            })
            .collect();
        PhaseCatalog::new(specs).unwrap()
    }

    fn sample(tier: SpeedTier) -> NetworkQualitySample {
        NetworkQualitySample::assumed(tier)
    }

    #[test]
    fn test_medium_desktop_keeps_nominals() {
        let phases = plan(
            &catalog(&[1000, 2000]),
            &PlannerConfig::default(),
            &sample(SpeedTier::Medium),
            DeviceClass::Desktop,
        );
        assert_eq!(phases[0].planned_duration, Duration::from_millis(1000));
        assert_eq!(phases[1].planned_duration, Duration::from_millis(2000));
    }

    #[test]
    fn test_speed_multipliers() {
        let config = PlannerConfig::default();
        let slow = plan(
            &catalog(&[1000]),
            &config,
            &sample(SpeedTier::Slow),
            DeviceClass::Desktop,
        );
        assert_eq!(slow[0].planned_duration, Duration::from_millis(1500));

        let fast = plan(
            &catalog(&[1000]),
            &config,
            &sample(SpeedTier::Fast),
            DeviceClass::Desktop,
        );
        assert_eq!(fast[0].planned_duration, Duration::from_millis(700));
    }

    #[test]
    fn test_device_multiplier_is_uniform() {
        let phases = plan(
            &catalog(&[1000, 2000, 500]),
            &PlannerConfig::default(),
            &sample(SpeedTier::Medium),
            DeviceClass::Compact,
        );
        assert_eq!(phases[0].planned_duration, Duration::from_millis(800));
        assert_eq!(phases[1].planned_duration, Duration::from_millis(1600));
        assert_eq!(phases[2].planned_duration, Duration::from_millis(400));
    }

    #[test]
    fn test_floor_met_exactly_with_remainder_on_last() {
        let mut config = PlannerConfig::default();
        config.minimum_total_ms = 10_000;
        let phases = plan(
            &catalog(&[1000, 1000, 1000]),
            &config,
            &sample(SpeedTier::Medium),
            DeviceClass::Desktop,
        );
        // Shortfall 7000 over 3 phases: 2333 each, remainder 1 on the last
        assert_eq!(phases[0].planned_duration, Duration::from_millis(3333));
        assert_eq!(phases[1].planned_duration, Duration::from_millis(3333));
        assert_eq!(phases[2].planned_duration, Duration::from_millis(3334));
        assert_eq!(total_ms(&phases), 10_000);
    }

    #[test]
    fn test_floor_not_applied_when_already_met() {
        let mut config = PlannerConfig::default();
        config.minimum_total_ms = 1000;
        let phases = plan(
            &catalog(&[1000, 1000]),
            &config,
            &sample(SpeedTier::Medium),
            DeviceClass::Desktop,
        );
        assert_eq!(total_ms(&phases), 2000);
    }

    #[test]
    fn test_initial_phase_state() {
        let phases = plan(
            &catalog(&[1000, 2000]),
            &PlannerConfig::default(),
            &sample(SpeedTier::Medium),
            DeviceClass::Desktop,
        );
        assert!(phases
            .iter()
            .all(|p| p.status == PhaseStatus::Pending && p.progress_percent == 0.0));
        assert_eq!(phases[0].id, "phase-0");
        assert_eq!(phases[1].id, "phase-1");
    }

    proptest! {
        #[test]
        fn prop_floor_is_always_met_exactly(
            durations in prop::collection::vec(1u64..10_000, 1..20),
            floor_ms in 1u64..200_000,
            slow in 1u32..30,
        ) {
            let mut config = PlannerConfig::default();
            config.minimum_total_ms = floor_ms;
            config.slow_multiplier = f64::from(slow) / 10.0;

            let phases = plan(
                &catalog(&durations),
                &config,
                &sample(SpeedTier::Slow),
                DeviceClass::Desktop,
            );

            let total = total_ms(&phases);
            prop_assert!(total >= floor_ms);

            let scaled: u64 = durations
                .iter()
                .map(|&d| (((d as f64) * config.slow_multiplier).round() as u64).max(1))
                .sum();
            if scaled < floor_ms {
                prop_assert_eq!(total, floor_ms);
            } else {
                prop_assert_eq!(total, scaled);
            }
        }

        #[test]
        fn prop_phase_order_and_ids_preserved(
            durations in prop::collection::vec(1u64..5_000, 1..12),
        ) {
            let phases = plan(
                &catalog(&durations),
                &PlannerConfig::default(),
                &sample(SpeedTier::Medium),
                DeviceClass::Desktop,
            );
            prop_assert_eq!(phases.len(), durations.len());
            for (i, phase) in phases.iter().enumerate() {
                prop_assert_eq!(&phase.id, &format!("phase-{i}"));
            }
        }
    }
}
