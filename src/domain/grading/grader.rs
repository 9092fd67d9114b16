//! Relevance grader trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::passage::Passage;
use crate::domain::DomainError;

/// A relevance grade on the 0-10 local scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceGrade {
    /// Score in 0-10
    pub score: f32,
    /// Explanation for the score, when the grader supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RelevanceGrade {
    pub fn new(score: f32) -> Self {
        Self {
            score: score.clamp(0.0, 10.0),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Trait for grading local passage relevance
///
/// Pure scoring: no side effects beyond the call itself. Web passages are
/// never passed here; their provider score is carried through unchanged.
#[async_trait]
pub trait RelevanceGrader: Send + Sync + Debug {
    /// Score a single passage's relevance to the question, 0-10
    async fn grade(
        &self,
        question: &str,
        passage: &Passage,
    ) -> Result<RelevanceGrade, DomainError>;

    /// Get the grader name
    fn grader_name(&self) -> &'static str;
}
