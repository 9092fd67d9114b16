//! Pure phase-transition function
//!
//! Every edge of the state machine lives here, free of side effects, so
//! the branch policy can be tested exhaustively without any providers.
//! Phase handlers mutate state; this function only reads it.

use super::config::WorkflowConfig;
use super::state::{Phase, WorkflowState};

/// Compute the next phase after the current phase's handler has run
pub(crate) fn transition(state: &WorkflowState, config: &WorkflowConfig) -> Phase {
    // A handler that recorded a termination reason forces DONE regardless
    // of the normal edges
    if state.termination.is_some() {
        return Phase::Done;
    }

    match state.phase {
        Phase::Retrieve => Phase::Grade,

        // The sufficiency gate has already filtered state.passages: an
        // empty kept set routes to web search, never to generation
        Phase::Grade => {
            if state.passages.is_empty() {
                Phase::WebSearch
            } else {
                Phase::Generate
            }
        }

        Phase::WebSearch => Phase::Generate,

        Phase::Generate => Phase::ValidateGrounding,

        Phase::ValidateGrounding => match state.verdict {
            Some(v) if v.grounded => Phase::ValidateQuality,
            _ => retry_or_escalate(state, config),
        },

        Phase::ValidateQuality => match state.verdict {
            Some(v) if v.is_verified() => Phase::Done,
            _ => retry_or_escalate(state, config),
        },

        Phase::Done => Phase::Done,
    }
}

/// Shared back-edge policy for grounding and quality failures
///
/// Regenerate while the shared attempt budget lasts, then escalate to web
/// search at most `websearch_max_uses` times, then force DONE.
fn retry_or_escalate(state: &WorkflowState, config: &WorkflowConfig) -> Phase {
    if state.generation_attempts < config.max_generation_retries {
        Phase::Generate
    } else if state.websearch_uses < config.websearch_max_uses {
        Phase::WebSearch
    } else {
        Phase::Done
    }
}
