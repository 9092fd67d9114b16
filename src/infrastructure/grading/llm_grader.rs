//! LLM-based relevance grader
//!
//! Asks the model to score a passage's relevance to the question on the
//! 0-10 scale the sufficiency gate operates on.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::grading::{RelevanceGrade, RelevanceGrader};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::passage::Passage;
use crate::domain::DomainError;
use crate::infrastructure::json::extract_json;

const GRADING_SYSTEM_PROMPT: &str = "You are a grader assessing the relevance \
of a retrieved passage to a user question. If the passage contains keywords or \
semantic meaning related to the question, grade it as relevant.";

const GRADING_PROMPT_TEMPLATE: &str = r#"Retrieved passage:

${passage_content}

User question: ${question}

Rate the relevance of this passage to the question on a scale of 0 to 10, where:
- 0-3: Not relevant - the passage does not help answer the question
- 4-7: Partially relevant - the passage contains some related information
- 8-10: Highly relevant - the passage directly addresses the question

Respond with ONLY a JSON object in this exact format:
{"score": <number>, "reason": "<brief explanation>"}"#;

/// Relevance grader backed by an LLM
#[derive(Debug)]
pub struct LlmRelevanceGrader {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
}

impl LlmRelevanceGrader {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    fn build_prompt(&self, question: &str, passage: &Passage) -> String {
        GRADING_PROMPT_TEMPLATE
            .replace("${passage_content}", &passage.content)
            .replace("${question}", question)
    }

    fn parse_response(&self, content: &str) -> Result<GradeResponse, DomainError> {
        let json_str = extract_json(content).unwrap_or(content);

        serde_json::from_str(json_str).map_err(|e| {
            warn!("Failed to parse grading response: {} - {}", e, content);
            DomainError::provider(
                "llm_grader",
                format!("Invalid grading response format: {}", e),
            )
        })
    }
}

/// Response structure from the grading prompt
#[derive(Debug, Deserialize)]
struct GradeResponse {
    score: f32,
    reason: Option<String>,
}

#[async_trait]
impl RelevanceGrader for LlmRelevanceGrader {
    async fn grade(
        &self,
        question: &str,
        passage: &Passage,
    ) -> Result<RelevanceGrade, DomainError> {
        debug!(source = %passage.source, model = %self.model, "Grading passage");

        let request = LlmRequest::builder()
            .system(GRADING_SYSTEM_PROMPT)
            .user(self.build_prompt(question, passage))
            .temperature(self.temperature)
            .max_tokens(150)
            .build();

        let response = self.provider.chat(&self.model, request).await?;
        let parsed = self.parse_response(response.content())?;

        let mut grade = RelevanceGrade::new(parsed.score);
        if let Some(reason) = parsed.reason {
            grade = grade.with_reason(reason);
        }

        debug!(
            source = %passage.source,
            score = grade.score,
            "Passage graded"
        );

        Ok(grade)
    }

    fn grader_name(&self) -> &'static str {
        "llm"
    }
}
