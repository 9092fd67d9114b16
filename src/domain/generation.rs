//! Answer generation contract and drafts
//!
//! Drafts are superseded, never mutated: every retry produces a new
//! `Draft` with a fresh attempt index stamped by the orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::error::DomainError;
use super::passage::GradedPassage;
use super::query::Query;

/// A candidate answer with the evidence that backed it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub answer_text: String,
    /// The passages the generator was given, in order
    pub passages_used: Vec<GradedPassage>,
    /// 1-based attempt index within one query's lifecycle
    pub attempt: u32,
}

impl Draft {
    pub fn new(
        answer_text: impl Into<String>,
        passages_used: Vec<GradedPassage>,
        attempt: u32,
    ) -> Self {
        Self {
            answer_text: answer_text.into(),
            passages_used,
            attempt,
        }
    }
}

/// Trait for producing draft answers
///
/// Output is model-backed and may differ between calls with identical
/// inputs; the orchestrator never assumes determinism.
#[async_trait]
pub trait AnswerGenerator: Send + Sync + Debug {
    /// Generate answer text from the question, kept passages, and history
    async fn generate(
        &self,
        query: &Query,
        passages: &[GradedPassage],
    ) -> Result<String, DomainError>;

    /// Get the generator name
    fn generator_name(&self) -> &'static str;
}
