//! Workflow error types

use thiserror::Error;

use super::state::Phase;
use crate::domain::query::QueryValidationError;
use crate::domain::DomainError;

/// Errors terminating a workflow without an answer envelope
///
/// Bound exhaustion is deliberately absent: running out of retries is a
/// defined terminal outcome carrying the last draft, not an error.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Invalid input rejected before retrieval
    #[error("Invalid query: {0}")]
    FatalInput(#[from] QueryValidationError),

    /// A phase failed after its call-level retry
    #[error("Phase '{phase}' failed: {source}")]
    PhaseFailed {
        phase: Phase,
        #[source]
        source: DomainError,
    },

    /// The caller cancelled the query
    #[error("Workflow cancelled")]
    Cancelled,

    /// Invariant violation inside the state machine
    #[error("Internal workflow error: {message}")]
    Internal { message: String },
}

impl WorkflowError {
    pub fn phase_failed(phase: Phase, source: DomainError) -> Self {
        Self::PhaseFailed { phase, source }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
