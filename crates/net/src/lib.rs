#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network probing for splashtrack
//!
//! A thin HTTP client wrapper plus the network quality estimator that
//! classifies connection speed from probe round-trip latency. The
//! estimator is deliberately failure-proof: every error path degrades to
//! a fixed fallback sample instead of surfacing to the caller.

mod client;
mod estimator;

pub use client::{NetClient, NetConfig};
pub use estimator::QualityEstimator;
