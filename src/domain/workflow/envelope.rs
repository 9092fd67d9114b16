//! Terminal answer envelope
//!
//! Every terminal answer carries the draft that produced it and the
//! passages that backed it, on verified and forced-termination paths
//! alike, so a caller can always reconstruct why confidence is high or
//! low.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::TerminationReason;
use crate::domain::generation::Draft;
use crate::domain::passage::GradedPassage;
use crate::domain::validation::ValidationVerdict;

/// The terminal output of one workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    pub id: Uuid,
    pub answer_text: String,
    /// Exactly the passages of the draft being reported
    pub passages_used: Vec<GradedPassage>,
    /// True only when both grounding and quality validation passed
    pub verified: bool,
    pub web_search_used: bool,
    pub generation_attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ValidationVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<TerminationReason>,
    pub answered_at: DateTime<Utc>,
}

impl AnswerEnvelope {
    /// Build the envelope from the draft being reported and the final
    /// workflow counters
    pub fn from_draft(
        draft: &Draft,
        verdict: Option<ValidationVerdict>,
        web_search_used: bool,
        generation_attempts: u32,
        failure_reason: Option<TerminationReason>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            answer_text: draft.answer_text.clone(),
            passages_used: draft.passages_used.clone(),
            verified: verdict.map(|v| v.is_verified()).unwrap_or(false),
            web_search_used,
            generation_attempts,
            verdict,
            failure_reason,
            answered_at: Utc::now(),
        }
    }
}
