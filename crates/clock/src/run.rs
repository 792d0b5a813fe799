//! Run state: the owned phase list and the elapsed-time projection

use splashtrack_types::{Phase, PhaseStatus, RunId, RunState};
use std::time::Duration;

/// Optional hook consulted for the active phase on every projection.
///
/// Returning a status replaces the derived one. This is the seam for
/// binding phases to real operations that can fail; the simulated clock
/// itself never produces [`PhaseStatus::Error`].
pub type OutcomeOverride = dyn Fn(&Phase) -> Option<PhaseStatus> + Send + Sync;

/// One run of the tracker: the phase list plus its completion latch
#[derive(Debug)]
pub struct TrackerRun {
    run_id: RunId,
    phases: Vec<Phase>,
    started_at: tokio::time::Instant,
    total_planned: Duration,
    completed: bool,
}

impl TrackerRun {
    /// Take ownership of a planned phase list, fixing the start instant.
    ///
    /// # Panics
    ///
    /// Panics if `phases` is empty; the planner never produces an empty
    /// list, so this is a programming error rather than a runtime
    /// condition.
    #[must_use]
    pub fn new(phases: Vec<Phase>) -> Self {
        assert!(!phases.is_empty(), "a run needs at least one phase");
        let total_planned = phases.iter().map(|p| p.planned_duration).sum();
        Self {
            run_id: RunId::new(),
            phases,
            started_at: tokio::time::Instant::now(),
            total_planned,
            completed: false,
        }
    }

    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Wall-clock time since the run was constructed.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    #[must_use]
    pub fn total_planned(&self) -> Duration {
        self.total_planned
    }

    /// Whether the run has reached 100% overall progress.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Current statuses, in phase order.
    #[must_use]
    pub fn statuses(&self) -> Vec<PhaseStatus> {
        self.phases.iter().map(|p| p.status).collect()
    }

    /// Project elapsed time onto phase states and produce a snapshot.
    pub fn project(&mut self, elapsed: Duration) -> RunState {
        self.project_with(elapsed, None)
    }

    /// Project elapsed time, consulting an outcome override for the
    /// active phase.
    ///
    /// Each phase owns the window `[offset, offset + duration)` in the
    /// accumulated schedule: before the window it is pending, inside it
    /// is active with linear progress, at or past the end it is
    /// completed. Overall progress is elapsed over the planned total,
    /// clamped; once it reaches 100 the run's completion latch is set and
    /// never reset.
    pub fn project_with(
        &mut self,
        elapsed: Duration,
        outcome_override: Option<&OutcomeOverride>,
    ) -> RunState {
        let mut offset = Duration::ZERO;
        for phase in &mut self.phases {
            let end = offset + phase.planned_duration;
            if elapsed < offset {
                phase.status = PhaseStatus::Pending;
                phase.progress_percent = 0.0;
            } else if elapsed < end {
                phase.status = PhaseStatus::Active;
                phase.progress_percent = ((elapsed - offset).as_secs_f64()
                    / phase.planned_duration.as_secs_f64()
                    * 100.0)
                    .clamp(0.0, 100.0);
                if let Some(hook) = outcome_override {
                    if let Some(status) = hook(phase) {
                        phase.status = status;
                    }
                }
            } else {
                phase.status = PhaseStatus::Completed;
                phase.progress_percent = 100.0;
            }
            offset = end;
        }

        let overall_progress_percent = (elapsed.as_secs_f64()
            / self.total_planned.as_secs_f64()
            * 100.0)
            .clamp(0.0, 100.0);
        if overall_progress_percent >= 100.0 {
            self.completed = true;
        }

        RunState {
            run_id: self.run_id,
            current_phase: self
                .phases
                .iter()
                .find(|p| p.status == PhaseStatus::Active)
                .cloned(),
            overall_progress_percent,
            time_remaining: self.total_planned.saturating_sub(elapsed),
            total_planned_duration: self.total_planned,
            phases: self.phases.clone(),
            completed_phase_count: self
                .phases
                .iter()
                .filter(|p| p.status == PhaseStatus::Completed)
                .count(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn phase(id: &str, millis: u64) -> Phase {
        Phase {
            id: id.to_string(),
            display_name: id.to_string(),
            short_display_name: id.to_string(),
            description: String::new(),
            category: "data".to_string(),
            planned_duration: Duration::from_millis(millis),
            progress_percent: 0.0,
            status: PhaseStatus::Pending,
        }
    }

    fn two_phase_run() -> TrackerRun {
        TrackerRun::new(vec![phase("a", 1000), phase("b", 1000)])
    }

    #[test]
    fn test_total_planned_is_sum() {
        let run = two_phase_run();
        assert_eq!(run.total_planned(), Duration::from_millis(2000));
    }

    #[test]
    fn test_projection_midway_through_first_phase() {
        let mut run = two_phase_run();
        let state = run.project(Duration::from_millis(500));

        assert_eq!(state.phases[0].status, PhaseStatus::Active);
        assert_eq!(state.phases[0].progress_percent, 50.0);
        assert_eq!(state.phases[1].status, PhaseStatus::Pending);
        assert_eq!(state.phases[1].progress_percent, 0.0);
        assert_eq!(state.overall_progress_percent, 25.0);
        assert_eq!(state.time_remaining, Duration::from_millis(1500));
        assert_eq!(state.completed_phase_count, 0);
        assert_eq!(state.current_phase.as_ref().unwrap().id, "a");
        assert!(!run.is_completed());
    }

    #[test]
    fn test_projection_at_window_boundary() {
        let mut run = two_phase_run();
        let state = run.project(Duration::from_millis(1000));

        // The first window is half-open: at exactly its end the phase is
        // completed and the next one is active at 0%.
        assert_eq!(state.phases[0].status, PhaseStatus::Completed);
        assert_eq!(state.phases[0].progress_percent, 100.0);
        assert_eq!(state.phases[1].status, PhaseStatus::Active);
        assert_eq!(state.phases[1].progress_percent, 0.0);
        assert_eq!(state.completed_phase_count, 1);
    }

    #[test]
    fn test_projection_midway_through_second_phase() {
        let mut run = two_phase_run();
        let state = run.project(Duration::from_millis(1500));

        assert_eq!(state.phases[0].status, PhaseStatus::Completed);
        assert_eq!(state.phases[1].status, PhaseStatus::Active);
        assert_eq!(state.phases[1].progress_percent, 50.0);
        assert_eq!(state.overall_progress_percent, 75.0);
        assert_eq!(state.current_phase.as_ref().unwrap().id, "b");
    }

    #[test]
    fn test_projection_at_completion() {
        let mut run = two_phase_run();
        let state = run.project(Duration::from_millis(2000));

        assert!(state.phases.iter().all(Phase::is_completed));
        assert_eq!(state.overall_progress_percent, 100.0);
        assert_eq!(state.time_remaining, Duration::ZERO);
        assert!(state.current_phase.is_none());
        assert_eq!(state.completed_phase_count, 2);
        assert!(run.is_completed());
    }

    #[test]
    fn test_completion_latch_holds() {
        let mut run = two_phase_run();
        run.project(Duration::from_millis(5000));
        assert!(run.is_completed());
        // A projection is pure in elapsed time, but the latch never resets
        run.project(Duration::from_millis(5100));
        assert!(run.is_completed());
    }

    #[test]
    fn test_projection_recovers_from_time_jump() {
        let mut run = two_phase_run();
        run.project(Duration::from_millis(100));
        // Jump straight past the first phase, as after a suspended tab
        let state = run.project(Duration::from_millis(1700));
        assert_eq!(state.phases[0].status, PhaseStatus::Completed);
        assert_eq!(state.phases[1].status, PhaseStatus::Active);
    }

    #[test]
    fn test_at_most_one_active_with_ordered_statuses() {
        let mut run = TrackerRun::new(vec![phase("a", 300), phase("b", 700), phase("c", 500)]);
        for elapsed_ms in [0u64, 150, 300, 650, 1000, 1200, 1500, 2000] {
            let state = run.project(Duration::from_millis(elapsed_ms));
            let active = state
                .phases
                .iter()
                .filter(|p| p.status == PhaseStatus::Active)
                .count();
            assert!(active <= 1);
            if let Some(index) = state.active_index() {
                assert!(state.phases[..index]
                    .iter()
                    .all(|p| p.status == PhaseStatus::Completed));
                assert!(state.phases[index + 1..]
                    .iter()
                    .all(|p| p.status == PhaseStatus::Pending));
            }
        }
    }

    #[test]
    fn test_outcome_override_marks_error() {
        let mut run = two_phase_run();
        let hook: Box<OutcomeOverride> = Box::new(|phase: &Phase| {
            (phase.id == "a").then_some(PhaseStatus::Error)
        });
        let state = run.project_with(Duration::from_millis(500), Some(hook.as_ref()));
        assert_eq!(state.phases[0].status, PhaseStatus::Error);
        assert_eq!(state.phases[1].status, PhaseStatus::Pending);
    }

    #[test]
    #[should_panic(expected = "at least one phase")]
    fn test_empty_phase_list_panics() {
        let _ = TrackerRun::new(vec![]);
    }
}
