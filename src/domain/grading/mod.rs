//! Relevance grading contract and the document-sufficiency gate

mod gate;
mod grader;

pub use gate::{GateDecision, GateOutcome, SufficiencyGate};
pub use grader::{RelevanceGrade, RelevanceGrader};

#[cfg(test)]
pub use grader::mock::MockRelevanceGrader;
