//! LLM provider factory

use std::sync::Arc;

use super::http_client::HttpClient;
use super::openai::OpenAiProvider;
use crate::config::ModelSettings;
use crate::domain::llm::LlmProvider;
use crate::domain::DomainError;

/// Build the configured LLM provider
///
/// Any OpenAI-compatible endpoint works through `models.base_url`; the
/// official API is the default.
pub fn create_llm_provider(settings: &ModelSettings) -> Result<Arc<dyn LlmProvider>, DomainError> {
    let api_key = settings
        .api_key
        .clone()
        .ok_or_else(|| DomainError::configuration("models.api_key is not set"))?;

    let client = HttpClient::new();

    let provider = match &settings.base_url {
        Some(base_url) => OpenAiProvider::with_base_url(client, api_key, base_url),
        None => OpenAiProvider::new(client, api_key),
    };

    Ok(Arc::new(provider))
}
