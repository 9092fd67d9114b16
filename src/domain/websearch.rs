//! Web search fallback contract
//!
//! Invoked when local evidence is insufficient or validation exhausts its
//! retry budget. Hits carry a provider-assigned score on 0-1 which passes
//! through to the workflow unchanged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::error::DomainError;
use super::passage::{GradedPassage, Passage};

/// One web search result with its provider-assigned relevance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
    /// Provider relevance score in 0-1
    pub score: f32,
}

impl WebSearchHit {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            score: score.clamp(0.0, 1.0),
        }
    }

    /// Convert into a web-origin graded passage; source is title + URL
    pub fn into_graded_passage(self) -> GradedPassage {
        let source = format!("{}\n{}", self.title, self.url);
        GradedPassage::web(Passage::web(self.content, source), self.score)
    }
}

/// Trait for the external web search capability
#[async_trait]
pub trait WebSearchProvider: Send + Sync + Debug {
    /// Search the web for the query text
    async fn search(&self, query_text: &str) -> Result<Vec<WebSearchHit>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock web search provider for testing
    #[derive(Debug)]
    pub struct MockWebSearchProvider {
        hits: Vec<WebSearchHit>,
        error: Option<String>,
        search_count: AtomicUsize,
    }

    impl MockWebSearchProvider {
        pub fn new() -> Self {
            Self {
                hits: Vec::new(),
                error: None,
                search_count: AtomicUsize::new(0),
            }
        }

        pub fn with_hits(mut self, hits: Vec<WebSearchHit>) -> Self {
            self.hits = hits;
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn search_count(&self) -> usize {
            self.search_count.load(Ordering::SeqCst)
        }
    }

    impl Default for MockWebSearchProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl WebSearchProvider for MockWebSearchProvider {
        async fn search(&self, _query_text: &str) -> Result<Vec<WebSearchHit>, DomainError> {
            self.search_count.fetch_add(1, Ordering::SeqCst);

            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock_websearch", error));
            }

            Ok(self.hits.clone())
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
