//! Document-sufficiency gate
//!
//! The adaptive-routing decision: local evidence below the relevance
//! threshold is discarded entirely rather than padded into the prompt, and
//! an empty kept set routes the workflow to web search instead of
//! generation.

use serde::{Deserialize, Serialize};

use crate::domain::passage::GradedPassage;

/// Route chosen by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// Enough relevant local evidence: proceed to generation
    Generate,
    /// No passage cleared the threshold: fall back to web search
    WebSearch,
}

/// Result of applying the gate to a graded batch
#[derive(Debug, Clone)]
pub struct GateOutcome {
    /// Passages that cleared the threshold, original order preserved
    pub kept: Vec<GradedPassage>,
    /// Number of passages discarded
    pub discarded: usize,
    pub decision: GateDecision,
}

/// The relevance-threshold filter over a graded batch
#[derive(Debug, Clone, Copy)]
pub struct SufficiencyGate {
    threshold: f32,
}

impl SufficiencyGate {
    /// Create a gate with a threshold on the 0-10 local scale
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 10.0),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Keep passages meeting the threshold and decide the next route.
    /// Web-scored passages are provider-vetted and always kept.
    pub fn apply(&self, graded: Vec<GradedPassage>) -> GateOutcome {
        let total = graded.len();

        let kept: Vec<GradedPassage> = graded
            .into_iter()
            .filter(|p| p.score.meets_local_threshold(self.threshold))
            .collect();

        let decision = if kept.is_empty() {
            GateDecision::WebSearch
        } else {
            GateDecision::Generate
        };

        GateOutcome {
            discarded: total - kept.len(),
            kept,
            decision,
        }
    }
}
