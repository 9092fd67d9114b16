//! Tavily web search client
//!
//! Tavily returns content snippets with a relevance score in 0-1, which
//! the workflow carries through unchanged.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::websearch::{WebSearchHit, WebSearchProvider};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
const DEFAULT_MAX_RESULTS: u32 = 3;

/// Web search provider backed by the Tavily API
#[derive(Debug)]
pub struct TavilyWebSearch<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    max_results: u32,
}

impl<C: HttpClientTrait> TavilyWebSearch<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_TAVILY_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> WebSearchProvider for TavilyWebSearch<C> {
    async fn search(&self, query_text: &str) -> Result<Vec<WebSearchHit>, DomainError> {
        debug!(max_results = self.max_results, "Searching the web");

        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": query_text,
            "max_results": self.max_results,
        });

        let response = self
            .client
            .post_json(
                &self.search_url(),
                vec![("Content-Type", "application/json")],
                &body,
            )
            .await?;

        let parsed: TavilyResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("tavily", format!("Failed to parse response: {}", e))
        })?;

        let hits = parsed
            .results
            .into_iter()
            .map(|r| WebSearchHit::new(r.title, r.url, r.content, r.score))
            .collect();

        Ok(hits)
    }

    fn provider_name(&self) -> &'static str {
        "tavily"
    }
}

// Tavily API types

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
    score: f32,
}
