#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Tracker facade: estimator -> planner -> clock
//!
//! Wires the pipeline together behind one type. Variant behavior
//! (compact devices, forced speed tiers, minimum run durations, custom
//! catalogs) is all configuration; one `Tracker` replaces a family of
//! near-duplicate loader implementations.

use splashtrack_clock::{ProgressClock, RunHandle, RunObserver};
use splashtrack_config::Config;
use splashtrack_errors::Error;
use splashtrack_events::{EventEmitter, EventSender, TrackerEvent};
use splashtrack_net::{NetClient, NetConfig, QualityEstimator};
use splashtrack_planner::plan;
use splashtrack_types::{NetworkQualitySample, Phase};
use tracing::info;

/// Coordinates one or more tracker runs from a single configuration
pub struct Tracker {
    config: Config,
    estimator: QualityEstimator,
    event_sender: Option<EventSender>,
}

impl EventEmitter for Tracker {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl Tracker {
    /// Build a tracker from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation or the HTTP
    /// client cannot be constructed.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let client = NetClient::new(NetConfig::default())?;
        let estimator = QualityEstimator::new(client, config.estimator.clone());
        Ok(Self {
            config,
            estimator,
            event_sender: None,
        })
    }

    /// Attach an event sender, shared with the estimator and clock
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.estimator = self.estimator.with_events(sender.clone());
        self.event_sender = Some(sender);
        self
    }

    /// The configuration this tracker was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Obtain the network sample a run would be planned from.
    ///
    /// Honors the configured speed override without probing; otherwise
    /// defers to the estimator (cached within its validity window).
    pub async fn sample(&self) -> NetworkQualitySample {
        if let Some(tier) = self.config.run.speed_override {
            info!(%tier, "using configured speed override, skipping probes");
            return NetworkQualitySample::assumed(tier);
        }
        self.estimator.detect().await
    }

    /// Plan the phase list for a run from a sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured phase catalog is malformed.
    pub fn plan_phases(&self, sample: &NetworkQualitySample) -> Result<Vec<Phase>, Error> {
        let catalog = self.config.catalog()?;
        let phases = plan(&catalog, &self.config.planner, sample, self.config.run.device);
        self.emit(TrackerEvent::PlanReady {
            tier: sample.tier,
            phase_count: phases.len(),
            total_planned: phases.iter().map(|p| p.planned_duration).sum(),
        });
        Ok(phases)
    }

    /// Detect, plan, and start a run.
    ///
    /// Detection happens before the clock starts, so phase durations are
    /// fixed for the whole run and the clock never blocks on I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured phase catalog is malformed.
    pub async fn start<O: RunObserver>(&self, observer: O) -> Result<RunHandle, Error> {
        let sample = self.sample().await;
        let phases = self.plan_phases(&sample)?;

        let mut clock = ProgressClock::new(self.config.clock.clone());
        if let Some(sender) = &self.event_sender {
            clock = clock.with_events(sender.clone());
        }
        Ok(clock.start(phases, observer))
    }
}
