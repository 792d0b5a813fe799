//! Network-related error types
//!
//! These never escape the estimator's `detect()` surface; they describe
//! individual probe failures that are logged and then discarded.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetworkError {
    #[error("probe timeout for {url}")]
    Timeout { url: String },

    #[error("probe failed for {url}: {message}")]
    ProbeFailed { url: String, message: String },

    #[error("HTTP error {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid probe URL: {0}")]
    InvalidUrl(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),
}
