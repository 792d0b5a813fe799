#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Progress clock for splashtrack
//!
//! The ticking engine that maps elapsed wall-clock time onto phase states
//! and overall progress. Per-tick state is a pure projection of elapsed
//! time over the fixed phase windows, never an increment on the previous
//! tick, so a run survives delayed tick delivery (a suspended consumer
//! catching up in one jump) without drift or double counting.

mod clock;
mod run;

pub use clock::{observer, FnObserver, ProgressClock, RunHandle, RunObserver};
pub use run::{OutcomeOverride, TrackerRun};
