//! Error types for orchestrator operations.

use assistant_core::{BrainError, SkillError};
use thiserror::Error;

/// Errors that can occur while building or running the orchestrator.
///
/// Message handling itself degrades to user-facing notes instead of
/// erroring; these variants surface construction and configuration
/// problems.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A backend client failed.
    #[error("brain error: {0}")]
    Brain(#[from] BrainError),

    /// A skill call failed.
    #[error("skill error: {0}")]
    Skill(#[from] SkillError),
}
