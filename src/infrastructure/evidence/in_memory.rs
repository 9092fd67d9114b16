//! In-memory evidence store
//!
//! Deterministic term-overlap ranking over seeded documents. This is the
//! development and test backend; real vector stores live behind the same
//! trait as external collaborators.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::evidence::EvidenceStore;
use crate::domain::passage::Passage;
use crate::domain::query::CollectionId;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct StoredDocument {
    source: String,
    content: String,
}

/// Seedable in-memory evidence store with term-overlap ranking
#[derive(Debug, Default)]
pub struct InMemoryEvidenceStore {
    collections: RwLock<HashMap<CollectionId, Vec<StoredDocument>>>,
}

impl InMemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document to a collection
    pub async fn add_document(
        &self,
        collection: &CollectionId,
        source: impl Into<String>,
        content: impl Into<String>,
    ) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.clone())
            .or_default()
            .push(StoredDocument {
                source: source.into(),
                content: content.into(),
            });
    }

    pub async fn document_count(&self, collection: &CollectionId) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn terms(text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn overlap_score(query_terms: &HashSet<String>, content: &str) -> f32 {
        if query_terms.is_empty() {
            return 0.0;
        }

        let content_terms = Self::terms(content);
        let matched = query_terms.intersection(&content_terms).count();

        matched as f32 / query_terms.len() as f32
    }
}

#[async_trait]
impl EvidenceStore for InMemoryEvidenceStore {
    async fn search(
        &self,
        query_text: &str,
        collection: &CollectionId,
        k: u32,
    ) -> Result<Vec<Passage>, DomainError> {
        let collections = self.collections.read().await;

        let Some(documents) = collections.get(collection) else {
            debug!(collection = %collection, "Unknown collection, returning no passages");
            return Ok(Vec::new());
        };

        let query_terms = Self::terms(query_text);

        let mut scored: Vec<(f32, &StoredDocument)> = documents
            .iter()
            .map(|doc| (Self::overlap_score(&query_terms, &doc.content), doc))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        // Stable sort keeps insertion order among ties
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k as usize)
            .map(|(_, doc)| Passage::local(doc.content.clone(), doc.source.clone()))
            .collect())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
