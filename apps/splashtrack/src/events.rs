//! Event handling: renders tick events and routes the rest to tracing

use crate::display::OutputRenderer;
use splashtrack_events::{EventMessage, EventReceiver, TrackerEvent};
use tracing::{debug, info, trace, warn};

/// Consumes the event channel for the lifetime of a command
pub struct EventHandler {
    receiver: EventReceiver,
    renderer: OutputRenderer,
}

impl EventHandler {
    pub fn new(receiver: EventReceiver, renderer: OutputRenderer) -> Self {
        Self { receiver, renderer }
    }

    /// Drain events until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(message) = self.receiver.recv().await {
            self.handle(&message);
        }
    }

    fn handle(&self, message: &EventMessage) {
        if self.renderer.json() {
            if !matches!(message.event, TrackerEvent::Tick { .. }) {
                println!(
                    "{}",
                    serde_json::to_string(message).unwrap_or_default()
                );
            }
            return;
        }

        match &message.event {
            TrackerEvent::Tick { state } => self.renderer.render_tick(state),
            TrackerEvent::RunCompleted { run_id, elapsed } => {
                self.renderer.render_complete(*elapsed);
                info!(run_id = %run_id, elapsed = ?elapsed, "run completed");
            }
            event => log_event(message, event),
        }
    }
}

/// Route a non-rendered event to the tracing infrastructure with
/// structured fields.
fn log_event(message: &EventMessage, event: &TrackerEvent) {
    let source = message.meta.source.as_str();
    match event {
        TrackerEvent::DetectionStarted { probe_count } => {
            debug!(source, probe_count, "network detection started");
        }
        TrackerEvent::ProbeCompleted { url, latency_ms } => {
            debug!(source, url = %url, latency_ms, "probe completed");
        }
        TrackerEvent::ProbeFailed { url, error } => {
            warn!(source, url = %url, error = %error, "probe failed");
        }
        TrackerEvent::DetectionCompleted { sample } => {
            info!(
                source,
                tier = %sample.tier,
                latency_ms = sample.latency_ms,
                quality = %sample.quality,
                "network detection complete"
            );
        }
        TrackerEvent::DetectionFellBack { reason } => {
            warn!(source, reason = %reason, "detection fell back to defaults");
        }
        TrackerEvent::PlanReady {
            tier,
            phase_count,
            total_planned,
        } => {
            info!(
                source,
                tier = %tier,
                phase_count,
                total = ?total_planned,
                "phase plan ready"
            );
        }
        TrackerEvent::RunStarted {
            run_id,
            phase_count,
            total_planned,
        } => {
            info!(
                source,
                run_id = %run_id,
                phase_count,
                total = ?total_planned,
                "run started"
            );
        }
        TrackerEvent::PhaseStarted {
            run_id,
            phase_id,
            display_name,
        } => {
            debug!(source, run_id = %run_id, phase_id = %phase_id, name = %display_name, "phase started");
        }
        TrackerEvent::PhaseCompleted { run_id, phase_id } => {
            debug!(source, run_id = %run_id, phase_id = %phase_id, "phase completed");
        }
        TrackerEvent::RunCancelled { run_id } => {
            info!(source, run_id = %run_id, "run cancelled");
        }
        TrackerEvent::Tick { state } => {
            trace!(source, progress = state.overall_progress_percent, "tick");
        }
        TrackerEvent::RunCompleted { .. } => {}
    }
}
