//! Error types for brain and skill operations.

use thiserror::Error;

/// Errors that can occur during brain operations.
#[derive(Debug, Error)]
pub enum BrainError {
    /// Credentials or settings are missing or invalid. Not retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A network request could not be completed.
    #[error("network error: {0}")]
    Network(String),

    /// The backend did not answer within the allowed time.
    #[error("backend timed out after {seconds}s")]
    Timeout {
        /// Configured limit that was exceeded.
        seconds: u64,
    },

    /// The backend rejected the presented credentials.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },

    /// The backend answered but produced no usable text.
    #[error("empty response from backend")]
    EmptyResponse,

    /// A response body could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Errors that can occur during skill execution.
#[derive(Debug, Clone, Error)]
pub enum SkillError {
    /// The skill is wired up but its backing service is not configured.
    #[error("{0} is not configured")]
    NotConfigured(String),

    /// The skill ran and failed.
    #[error("skill failed: {0}")]
    Failed(String),
}
