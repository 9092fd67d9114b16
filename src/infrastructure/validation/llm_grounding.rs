//! LLM-based grounding validator
//!
//! Checks whether a draft answer is supported by the passages it was
//! generated from.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::generation::Draft;
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::validation::GroundingValidator;
use crate::domain::DomainError;
use crate::infrastructure::json::extract_json;

const GROUNDING_SYSTEM_PROMPT: &str = "You are a grader assessing whether an \
answer is grounded in / supported by a set of retrieved facts. The answer is \
grounded only if every material claim it makes is supported by the facts.";

const GROUNDING_PROMPT_TEMPLATE: &str = r#"Set of facts:

${facts}

Answer:

${answer}

Respond with ONLY a JSON object in this exact format:
{"grounded": <true or false>, "reason": "<brief explanation>"}"#;

/// Grounding validator backed by an LLM
#[derive(Debug)]
pub struct LlmGroundingValidator {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl LlmGroundingValidator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn build_prompt(&self, draft: &Draft) -> String {
        let facts = draft
            .passages_used
            .iter()
            .map(|p| format!("[{}]\n{}", p.passage.source, p.passage.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        GROUNDING_PROMPT_TEMPLATE
            .replace("${facts}", &facts)
            .replace("${answer}", &draft.answer_text)
    }

    fn parse_response(&self, content: &str) -> Result<bool, DomainError> {
        let json_str = extract_json(content).unwrap_or(content);

        let parsed: GroundingResponse = serde_json::from_str(json_str).map_err(|e| {
            warn!("Failed to parse grounding response: {} - {}", e, content);
            DomainError::provider(
                "grounding_validator",
                format!("Invalid grounding response format: {}", e),
            )
        })?;

        Ok(parsed.grounded)
    }
}

#[derive(Debug, Deserialize)]
struct GroundingResponse {
    grounded: bool,
    #[allow(dead_code)]
    reason: Option<String>,
}

#[async_trait]
impl GroundingValidator for LlmGroundingValidator {
    async fn is_grounded(&self, draft: &Draft) -> Result<bool, DomainError> {
        debug!(
            model = %self.model,
            attempt = draft.attempt,
            "Validating grounding"
        );

        let request = LlmRequest::builder()
            .system(GROUNDING_SYSTEM_PROMPT)
            .user(self.build_prompt(draft))
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
