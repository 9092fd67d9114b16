//! Relevance grading implementations

mod llm_grader;

pub use llm_grader::LlmRelevanceGrader;
