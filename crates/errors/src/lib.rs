#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for splashtrack
//!
//! Fine-grained error types organized by domain. The progress simulation
//! itself has no fatal error class: probe failures degrade to a fallback
//! sample and cancellation is a normal terminal transition. These types
//! cover the recoverable probe layer and configuration loading.

use thiserror::Error;

pub mod config;
pub mod network;

// Re-export all error types at the root
pub use config::ConfigError;
pub use network::NetworkError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
