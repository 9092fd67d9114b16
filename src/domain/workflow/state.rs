//! Workflow phases and per-query state
//!
//! `WorkflowState` is owned exclusively by the orchestrator for the
//! lifetime of one query and discarded after the terminal answer is
//! returned. Phase handlers are its only writers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::generation::Draft;
use crate::domain::passage::{GradedPassage, Passage};
use crate::domain::query::Query;
use crate::domain::validation::ValidationVerdict;

/// Phases of the workflow state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Retrieve,
    Grade,
    Generate,
    WebSearch,
    ValidateGrounding,
    ValidateQuality,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retrieve => write!(f, "retrieve"),
            Self::Grade => write!(f, "grade"),
            Self::Generate => write!(f, "generate"),
            Self::WebSearch => write!(f, "web_search"),
            Self::ValidateGrounding => write!(f, "validate_grounding"),
            Self::ValidateQuality => write!(f, "validate_quality"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Why an unverified answer was returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The shared generation/escalation budget ran out with validation
    /// still failing
    RetriesExhausted,
    /// Web search escalation failed after a draft already existed
    WebSearchFailed,
}

/// Mutable state of one workflow instance
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub query: Query,
    /// Raw passages from the evidence store, awaiting grading
    pub retrieved: Vec<Passage>,
    /// Evidence currently kept for generation (gate survivors plus any
    /// web search results)
    pub passages: Vec<GradedPassage>,
    pub draft: Option<Draft>,
    pub verdict: Option<ValidationVerdict>,
    pub generation_attempts: u32,
    pub websearch_uses: u32,
    pub phase: Phase,
    pub termination: Option<TerminationReason>,
}

impl WorkflowState {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            retrieved: Vec::new(),
            passages: Vec::new(),
            draft: None,
            verdict: None,
            generation_attempts: 0,
            websearch_uses: 0,
            phase: Phase::Retrieve,
            termination: None,
        }
    }

    pub fn web_search_used(&self) -> bool {
        self.websearch_uses > 0
    }
}

/// Cooperative cancellation for one query
///
/// The orchestrator checks the flag at every phase boundary and stops
/// issuing further calls once it is set. In-flight call results are
/// discarded, not interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
