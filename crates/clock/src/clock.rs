//! The ticking engine and its run handle

use splashtrack_config::ClockConfig;
use splashtrack_events::{EventEmitter, EventSender, TrackerEvent};
use splashtrack_types::{Phase, PhaseStatus, RunId, RunState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::run::{OutcomeOverride, TrackerRun};

/// Observer of a run's tick stream
///
/// `on_tick` receives a fresh snapshot on every tick; `on_complete` fires
/// exactly once, after the settle delay, and never after cancellation.
pub trait RunObserver: Send + 'static {
    fn on_tick(&mut self, state: &RunState);
    fn on_complete(&mut self);
}

/// No-op observer for callers that only consume events
impl RunObserver for () {
    fn on_tick(&mut self, _state: &RunState) {}
    fn on_complete(&mut self) {}
}

/// Closure-backed observer
pub struct FnObserver<T, C> {
    on_tick: T,
    on_complete: Option<C>,
}

impl<T, C> RunObserver for FnObserver<T, C>
where
    T: FnMut(&RunState) + Send + 'static,
    C: FnOnce() + Send + 'static,
{
    fn on_tick(&mut self, state: &RunState) {
        (self.on_tick)(state);
    }

    fn on_complete(&mut self) {
        if let Some(complete) = self.on_complete.take() {
            complete();
        }
    }
}

/// Build an observer from a tick closure and a completion closure.
pub fn observer<T, C>(on_tick: T, on_complete: C) -> FnObserver<T, C>
where
    T: FnMut(&RunState) + Send + 'static,
    C: FnOnce() + Send + 'static,
{
    FnObserver {
        on_tick,
        on_complete: Some(on_complete),
    }
}

/// Handle to a running clock
///
/// Dropping the handle leaves the run ticking detached; call
/// [`RunHandle::cancel`] to stop it.
#[derive(Debug)]
pub struct RunHandle {
    run_id: RunId,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
    event_sender: Option<EventSender>,
}

impl RunHandle {
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Whether the run has finished ticking (completed or cancelled).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the run immediately.
    ///
    /// All scheduled ticking ceases and no further observer callbacks are
    /// made once this returns.
    pub fn cancel(self) {
        let was_running = !self.task.is_finished();
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
        if was_running {
            debug!(run_id = %self.run_id, "run cancelled");
            self.event_sender.emit(TrackerEvent::RunCancelled {
                run_id: self.run_id,
            });
        }
    }

    /// Wait for the run to finish on its own.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

/// The progress clock: drives one run from a phase list to completion
pub struct ProgressClock {
    config: ClockConfig,
    event_sender: Option<EventSender>,
    outcome_override: Option<Box<OutcomeOverride>>,
}

impl EventEmitter for ProgressClock {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl ProgressClock {
    #[must_use]
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            event_sender: None,
            outcome_override: None,
        }
    }

    /// Attach an event sender for run lifecycle and tick events
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Install the phase-outcome override consulted for the active phase.
    ///
    /// Reserved for binding phases to real operations; without it the
    /// clock never assigns [`PhaseStatus::Error`].
    #[must_use]
    pub fn with_outcome_override<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Phase) -> Option<PhaseStatus> + Send + Sync + 'static,
    {
        self.outcome_override = Some(Box::new(hook));
        self
    }

    /// Start ticking a run over the given phases.
    ///
    /// Must be called within a tokio runtime; the run is driven by a
    /// spawned task and the returned handle cancels or awaits it.
    ///
    /// # Panics
    ///
    /// Panics if `phases` is empty (a programming error; the planner
    /// never produces an empty list).
    #[must_use]
    pub fn start<O: RunObserver>(self, phases: Vec<Phase>, observer: O) -> RunHandle {
        let run = TrackerRun::new(phases);
        let run_id = run.run_id();
        let cancelled = Arc::new(AtomicBool::new(false));
        let event_sender = self.event_sender.clone();

        self.emit(TrackerEvent::RunStarted {
            run_id,
            phase_count: run.statuses().len(),
            total_planned: run.total_planned(),
        });
        debug!(
            run_id = %run_id,
            total = ?run.total_planned(),
            "starting run"
        );

        let flag = Arc::clone(&cancelled);
        let task = tokio::spawn(self.drive(run, observer, flag));

        RunHandle {
            run_id,
            cancelled,
            task,
            event_sender,
        }
    }

    /// Tick loop: one in-flight tick at a time, driven by elapsed time.
    async fn drive<O: RunObserver>(
        self,
        mut run: TrackerRun,
        mut observer: O,
        cancelled: Arc<AtomicBool>,
    ) {
        let run_id = run.run_id();
        let mut interval = tokio::time::interval(self.config.tick_interval());
        // A long tick delays the next one rather than bursting to catch up
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut previous = run.statuses();

        loop {
            interval.tick().await;
            if cancelled.load(Ordering::SeqCst) {
                return;
            }

            let elapsed = run.elapsed();
            let state = run.project_with(elapsed, self.outcome_override.as_deref());
            self.emit_transitions(run_id, &previous, &state.phases);
            previous = state.phases.iter().map(|p| p.status).collect();

            self.emit(TrackerEvent::Tick {
                state: state.clone(),
            });
            observer.on_tick(&state);

            if run.is_completed() {
                // Let the final tick render before teardown
                tokio::time::sleep(self.config.settle_delay()).await;
                if cancelled.load(Ordering::SeqCst) {
                    return;
                }
                debug!(run_id = %run_id, elapsed = ?run.elapsed(), "run completed");
                self.emit(TrackerEvent::RunCompleted {
                    run_id,
                    elapsed: run.elapsed(),
                });
                observer.on_complete();
                return;
            }
        }
    }

    /// Emit phase lifecycle events by diffing statuses between ticks.
    fn emit_transitions(&self, run_id: RunId, previous: &[PhaseStatus], phases: &[Phase]) {
        for (before, phase) in previous.iter().zip(phases) {
            match (before, phase.status) {
                (PhaseStatus::Pending, PhaseStatus::Active) => {
                    self.emit(TrackerEvent::PhaseStarted {
                        run_id,
                        phase_id: phase.id.clone(),
                        display_name: phase.display_name.clone(),
                    });
                }
                (PhaseStatus::Pending | PhaseStatus::Active, PhaseStatus::Completed) => {
                    self.emit(TrackerEvent::PhaseCompleted {
                        run_id,
                        phase_id: phase.id.clone(),
                    });
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use splashtrack_events::channel;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

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

    fn test_clock_config() -> ClockConfig {
        ClockConfig {
            tick_interval_ms: 100,
            settle_delay_ms: 600,
        }
    }

    struct Spy {
        states: Arc<Mutex<Vec<RunState>>>,
        completions: Arc<AtomicUsize>,
    }

    impl RunObserver for Spy {
        fn on_tick(&mut self, state: &RunState) {
            self.states.lock().unwrap().push(state.clone());
        }

        fn on_complete(&mut self) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn spy() -> (Spy, Arc<Mutex<Vec<RunState>>>, Arc<AtomicUsize>) {
        let states = Arc::new(Mutex::new(Vec::new()));
        let completions = Arc::new(AtomicUsize::new(0));
        (
            Spy {
                states: Arc::clone(&states),
                completions: Arc::clone(&completions),
            },
            states,
            completions,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_phase_scenario() {
        let (observer, states, completions) = spy();
        let clock = ProgressClock::new(test_clock_config());
        let handle = clock.start(vec![phase("a", 1000), phase("b", 1000)], observer);

        tokio::time::sleep(Duration::from_millis(505)).await;
        {
            let states = states.lock().unwrap();
            let state = states.last().unwrap();
            assert_eq!(state.phases[0].status, PhaseStatus::Active);
            assert_eq!(state.phases[0].progress_percent, 50.0);
            assert_eq!(state.phases[1].status, PhaseStatus::Pending);
            assert_eq!(state.overall_progress_percent, 25.0);
        }

        tokio::time::sleep(Duration::from_millis(1000)).await;
        {
            let states = states.lock().unwrap();
            let state = states.last().unwrap();
            assert_eq!(state.phases[0].status, PhaseStatus::Completed);
            assert_eq!(state.phases[1].status, PhaseStatus::Active);
            assert_eq!(state.phases[1].progress_percent, 50.0);
            assert_eq!(state.overall_progress_percent, 75.0);
        }

        // Run to completion plus the settle delay
        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        {
            let states = states.lock().unwrap();
            let state = states.last().unwrap();
            assert!(state.phases.iter().all(Phase::is_completed));
            assert_eq!(state.overall_progress_percent, 100.0);
        }

        // Nothing fires twice
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overall_progress_is_monotonic() {
        let (observer, states, _completions) = spy();
        let clock = ProgressClock::new(test_clock_config());
        let _handle = clock.start(vec![phase("a", 700), phase("b", 1300)], observer);

        tokio::time::sleep(Duration::from_millis(3000)).await;

        let states = states.lock().unwrap();
        assert!(!states.is_empty());
        for pair in states.windows(2) {
            assert!(pair[1].overall_progress_percent >= pair[0].overall_progress_percent);
        }
        // The planned total is fixed for the life of the run
        for state in states.iter() {
            assert_eq!(state.total_planned_duration, Duration::from_millis(2000));
            let sum: Duration = state.phases.iter().map(|p| p.planned_duration).sum();
            assert_eq!(sum, state.total_planned_duration);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_most_one_active_per_tick() {
        let (observer, states, _completions) = spy();
        let clock = ProgressClock::new(test_clock_config());
        let _handle = clock.start(
            vec![phase("a", 400), phase("b", 900), phase("c", 600)],
            observer,
        );

        tokio::time::sleep(Duration::from_millis(3000)).await;

        let states = states.lock().unwrap();
        for state in states.iter() {
            let active = state
                .phases
                .iter()
                .filter(|p| p.status == PhaseStatus::Active)
                .count();
            assert!(active <= 1);
            if let Some(index) = state.active_index() {
                assert!(state.phases[..index].iter().all(Phase::is_completed));
                assert!(state.phases[index + 1..]
                    .iter()
                    .all(|p| p.status == PhaseStatus::Pending));
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_only_after_full_progress() {
        let (observer, states, completions) = spy();
        let clock = ProgressClock::new(test_clock_config());
        let _handle = clock.start(vec![phase("a", 500)], observer);

        // Before the run can possibly finish
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(completions.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        let states = states.lock().unwrap();
        assert!(states
            .iter()
            .any(|s| s.overall_progress_percent == 100.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_all_callbacks() {
        let (observer, states, completions) = spy();
        let clock = ProgressClock::new(test_clock_config());
        let handle = clock.start(vec![phase("a", 1000), phase("b", 1000)], observer);

        tokio::time::sleep(Duration::from_millis(250)).await;
        handle.cancel();

        let ticks_at_cancel = states.lock().unwrap().len();
        assert!(ticks_at_cancel > 0);

        // Advance far past where the run would have completed
        tokio::time::sleep(Duration::from_millis(5000)).await;

        assert_eq!(states.lock().unwrap().len(), ticks_at_cancel);
        assert_eq!(completions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_emits_event() {
        let (tx, mut rx) = channel();
        let clock = ProgressClock::new(test_clock_config()).with_events(tx);
        let handle = clock.start(vec![phase("a", 1000)], ());

        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.cancel();

        let mut saw_cancelled = false;
        while let Ok(message) = rx.try_recv() {
            if matches!(message.event, TrackerEvent::RunCancelled { .. }) {
                saw_cancelled = true;
            }
        }
        assert!(saw_cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_transition_events() {
        let (tx, mut rx) = channel();
        let clock = ProgressClock::new(test_clock_config()).with_events(tx);
        let handle = clock.start(vec![phase("a", 300), phase("b", 300)], ());
        handle.wait().await;

        let mut started = Vec::new();
        let mut completed = Vec::new();
        let mut run_completions = 0;
        while let Ok(message) = rx.try_recv() {
            match message.event {
                TrackerEvent::PhaseStarted { phase_id, .. } => started.push(phase_id),
                TrackerEvent::PhaseCompleted { phase_id, .. } => completed.push(phase_id),
                TrackerEvent::RunCompleted { .. } => run_completions += 1,
                _ => {}
            }
        }

        assert_eq!(started, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(completed, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(run_completions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcome_override_reaches_active_phase() {
        let (observer, states, _completions) = spy();
        let clock = ProgressClock::new(test_clock_config())
            .with_outcome_override(|phase| (phase.id == "b").then_some(PhaseStatus::Error));
        let _handle = clock.start(vec![phase("a", 300), phase("b", 300)], observer);

        tokio::time::sleep(Duration::from_millis(500)).await;

        let states = states.lock().unwrap();
        assert!(states
            .iter()
            .any(|s| s.phases[1].status == PhaseStatus::Error));
    }
}
