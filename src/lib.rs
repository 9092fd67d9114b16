//! Grounded QA API
//!
//! A question-answering service that defends against unsupported answers:
//! retrieved evidence is graded for relevance, drafts are validated for
//! grounding and quality, and the workflow escalates to web search when
//! local evidence is insufficient - all under bounded retries.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::AppState;
use domain::evidence::EvidenceStore;
use domain::query::CollectionId;
use domain::workflow::AnswerWorkflow;
use domain::DomainError;
use infrastructure::evidence::InMemoryEvidenceStore;
use infrastructure::generation::LlmAnswerGenerator;
use infrastructure::grading::LlmRelevanceGrader;
use infrastructure::llm::{create_llm_provider, HttpClient};
use infrastructure::validation::{LlmGroundingValidator, LlmQualityValidator};
use infrastructure::websearch::TavilyWebSearch;

/// Assemble the workflow from configuration and an evidence store
pub fn build_workflow(
    config: &AppConfig,
    evidence: Arc<dyn EvidenceStore>,
) -> Result<AnswerWorkflow, DomainError> {
    let provider = create_llm_provider(&config.models)?;

    let grader = LlmRelevanceGrader::new(provider.clone(), config.models.grading_model.clone())
        .with_temperature(config.models.temperature);

    let generator =
        LlmAnswerGenerator::new(provider.clone(), config.models.generation_model.clone())
            .with_temperature(config.models.temperature);

    let grounding =
        LlmGroundingValidator::new(provider.clone(), config.models.validation_model.clone());

    let quality = LlmQualityValidator::new(provider, config.models.validation_model.clone());

    let websearch_key = config
        .websearch
        .api_key
        .clone()
        .ok_or_else(|| DomainError::configuration("websearch.api_key is not set"))?;

    let websearch = TavilyWebSearch::new(HttpClient::new(), websearch_key)
        .with_max_results(config.websearch.max_results);

    Ok(AnswerWorkflow::new(
        evidence,
        Arc::new(grader),
        Arc::new(generator),
        Arc::new(grounding),
        Arc::new(quality),
        Arc::new(websearch),
        config.workflow.clone(),
    ))
}

/// Build the shared application state for the HTTP server
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let evidence = Arc::new(InMemoryEvidenceStore::new());
    let workflow = build_workflow(config, evidence.clone())?;
    let default_collection = CollectionId::new(config.evidence.default_collection.clone())?;

    Ok(AppState::new(
        Arc::new(workflow),
        evidence,
        default_collection,
    ))
}
