//! Domain layer - entities, contracts, and the workflow state machine
//!
//! Everything here is I/O-free: external capabilities (evidence store,
//! graders, generator, validators, web search) are consumed through
//! `async_trait` contracts so the workflow can be driven by deterministic
//! stubs in tests.

pub mod error;
pub mod evidence;
pub mod generation;
pub mod grading;
pub mod llm;
pub mod passage;
pub mod query;
pub mod validation;
pub mod websearch;
pub mod workflow;

pub use error::DomainError;
pub use evidence::EvidenceStore;
pub use generation::{AnswerGenerator, Draft};
pub use grading::{GateDecision, RelevanceGrade, RelevanceGrader, SufficiencyGate};
pub use passage::{GradedPassage, Passage, PassageOrigin, RelevanceScore};
pub use query::{ChatTurn, CollectionId, Query, QueryValidationError};
pub use validation::{GroundingValidator, QualityValidator, ValidationVerdict};
pub use websearch::{WebSearchHit, WebSearchProvider};
pub use workflow::{
    AnswerEnvelope, AnswerWorkflow, CancellationFlag, TerminationReason, WorkflowConfig,
    WorkflowError,
};
