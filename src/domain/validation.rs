//! Draft validation contracts
//!
//! Two binary checks run after generation: grounding (every material claim
//! supported by the passages used) and quality (the draft actually answers
//! the question). Quality only runs once grounding has passed, and both
//! failure paths share one bounded retry budget owned by the orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::error::DomainError;
use super::generation::Draft;

/// Outcome of validating one draft
///
/// Attached to the draft's lifecycle, never mutating the draft itself.
/// Since quality runs only after grounding passes, an ungrounded verdict
/// always carries `addresses_question: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub grounded: bool,
    pub addresses_question: bool,
}

impl ValidationVerdict {
    /// Grounding failed; quality was never evaluated
    pub fn ungrounded() -> Self {
        Self {
            grounded: false,
            addresses_question: false,
        }
    }

    /// Grounded, but the answer missed the question
    pub fn off_topic() -> Self {
        Self {
            grounded: true,
            addresses_question: false,
        }
    }

    /// Both checks passed
    pub fn verified() -> Self {
        Self {
            grounded: true,
            addresses_question: true,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.grounded && self.addresses_question
    }
}

/// Trait for checking that a draft is supported by its passages
#[async_trait]
pub trait GroundingValidator: Send + Sync + Debug {
    async fn is_grounded(&self, draft: &Draft) -> Result<bool, DomainError>;

    fn validator_name(&self) -> &'static str;
}

/// Trait for checking that a draft addresses the question asked
#[async_trait]
pub trait QualityValidator: Send + Sync + Debug {
    async fn addresses_question(
        &self,
        question: &str,
        draft: &Draft,
    ) -> Result<bool, DomainError>;

    fn validator_name(&self) -> &'static str;
}
