//! LLM-based answer generator
//!
//! Renders the kept passages, recent conversation history, and the
//! question into a grounded answering prompt.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::generation::AnswerGenerator;
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::passage::GradedPassage;
use crate::domain::query::Query;
use crate::domain::DomainError;

const GENERATION_PROMPT_TEMPLATE: &str = r#"You are an intelligent assistant for question-answering tasks. Your goal is to provide accurate, helpful, and contextual responses.

INSTRUCTIONS:
- Use the retrieved context below to answer the current question
- Consider the chat history to maintain conversation continuity
- IMPORTANT: Always respond in the same language as the current question
- If you don't know the answer, clearly state that you don't know
- Keep answers concise but complete
- Reference specific information from the context when possible

CHAT HISTORY:
${chat_history}

RETRIEVED CONTEXT:
${context}

CURRENT QUESTION: ${question}

ANSWER:"#;

/// Answer generator backed by an LLM
#[derive(Debug)]
pub struct LlmAnswerGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
}

impl LlmAnswerGenerator {
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

    fn format_history(query: &Query) -> String {
        let recent = query.recent_history();

        if recent.is_empty() {
            return "No previous conversation.".to_string();
        }

        recent
            .iter()
            .map(|turn| format!("User: {}\nAssistant: {}", turn.user, turn.assistant))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_context(passages: &[GradedPassage]) -> String {
        if passages.is_empty() {
            return "No context available.".to_string();
        }

        passages
            .iter()
            .map(|p| format!("[{}]\n{}", p.passage.source, p.passage.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn build_prompt(&self, query: &Query, passages: &[GradedPassage]) -> String {
        GENERATION_PROMPT_TEMPLATE
            .replace("${chat_history}", &Self::format_history(query))
            .replace("${context}", &Self::format_context(passages))
            .replace("${question}", query.question())
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(
        &self,
        query: &Query,
        passages: &[GradedPassage],
    ) -> Result<String, DomainError> {
        debug!(
            model = %self.model,
            passages = passages.len(),
            "Generating answer"
        );

        let request = LlmRequest::builder()
            .user(self.build_prompt(query, passages))
            .temperature(self.temperature)
            .build();

        let response = self.provider.chat(&self.model, request).await?;
        let answer = response.content().trim().to_string();

        if answer.is_empty() {
            return Err(DomainError::provider(
                "llm_generator",
                "Empty answer from model",
            ));
        }

        Ok(answer)
    }

    fn generator_name(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::passage::Passage;
    use crate::domain::query::{ChatTurn, CollectionId};

    fn query() -> Query {
        Query::new(
            "What is the capital of France?",
            CollectionId::new("articles").unwrap(),
        )
        .unwrap()
    }

    fn passages() -> Vec<GradedPassage> {
        vec![
            GradedPassage::local(Passage::local("Paris is the capital.", "doc-1"), 9.0),
            GradedPassage::web(
                Passage::web("France's capital is Paris.", "Title\nhttps://a"),
                0.9,
            ),
        ]
    }

    #[tokio::test]
    async fn test_generator_returns_trimmed_answer() {
        let provider = Arc::new(
            MockLlmProvider::new("mock").with_content("  Paris is the capital of France.\n"),
        );
        let generator = LlmAnswerGenerator::new(provider, "gpt-4o");

        let answer = generator.generate(&query(), &passages()).await.unwrap();
        assert_eq!(answer, "Paris is the capital of France.");
    }

    #[tokio::test]
    async fn test_generator_rejects_empty_answer() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_content("   "));
        let generator = LlmAnswerGenerator::new(provider, "gpt-4o");

        assert!(generator.generate(&query(), &passages()).await.is_err());
    }

    #[test]
    fn test_prompt_renders_question_and_context() {
        let provider = Arc::new(MockLlmProvider::new("mock"));
        let generator = LlmAnswerGenerator::new(provider, "gpt-4o");

        let prompt = generator.build_prompt(&query(), &passages());

        assert!(prompt.contains("What is the capital of France?"));
        assert!(prompt.contains("Paris is the capital."));
        assert!(prompt.contains("[doc-1]"));
        assert!(prompt.contains("No previous conversation."));
    }

    #[test]
    fn test_prompt_renders_recent_history_only() {
        let provider = Arc::new(MockLlmProvider::new("mock"));
        let generator = LlmAnswerGenerator::new(provider, "gpt-4o");

        let history: Vec<ChatTurn> = (0..10)
            .map(|i| ChatTurn::new(format!("question {}", i), format!("answer {}", i)))
            .collect();
        let query = query().with_history(history);

        let prompt = generator.build_prompt(&query, &[]);

        assert!(!prompt.contains("question 3"));
        assert!(prompt.contains("question 4"));
        assert!(prompt.contains("question 9"));
        assert!(prompt.contains("No context available."));
    }
}
