//! LLM-based quality validator
//!
//! Checks whether a draft answer actually addresses the question asked.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::generation::Draft;
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::validation::QualityValidator;
use crate::domain::DomainError;
use crate::infrastructure::json::extract_json;

const QUALITY_SYSTEM_PROMPT: &str = "You are a grader assessing whether an \
answer addresses and resolves a question. An answer that is vague, evasive, \
or about a different topic does not address the question.";

const QUALITY_PROMPT_TEMPLATE: &str = r#"User question: ${question}

Answer:

${answer}

Respond with ONLY a JSON object in this exact format:
{"addresses_question": <true or false>, "reason": "<brief explanation>"}"#;

/// Quality validator backed by an LLM
#[derive(Debug)]
pub struct LlmQualityValidator {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl LlmQualityValidator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn build_prompt(&self, question: &str, draft: &Draft) -> String {
        QUALITY_PROMPT_TEMPLATE
            .replace("${question}", question)
            .replace("${answer}", &draft.answer_text)
    }

    fn parse_response(&self, content: &str) -> Result<bool, DomainError> {
        let json_str = extract_json(content).unwrap_or(content);

        let parsed: QualityResponse = serde_json::from_str(json_str).map_err(|e| {
            warn!("Failed to parse quality response: {} - {}", e, content);
            DomainError::provider(
                "quality_validator",
                format!("Invalid quality response format: {}", e),
            )
        })?;

        Ok(parsed.addresses_question)
    }
}

#[derive(Debug, Deserialize)]
struct QualityResponse {
    addresses_question: bool,
    #[allow(dead_code)]
    reason: Option<String>,
}

#[async_trait]
impl QualityValidator for LlmQualityValidator {
    async fn addresses_question(
        &self,
        question: &str,
        draft: &Draft,
    ) -> Result<bool, DomainError> {
        debug!(
            model = %self.model,
            attempt = draft.attempt,
            "Validating answer quality"
        );

        let request = LlmRequest::builder()
            .system(QUALITY_SYSTEM_PROMPT)
            .user(self.build_prompt(question, draft))
            .temperature(0.0)
            .max_tokens(150)
            .build();

        let response = self.provider.chat(&self.model, request).await?;
        self.parse_response(response.content())
    }

    fn validator_name(&self) -> &'static str {
        "llm"
    }
}
