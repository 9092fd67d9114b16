//! Evidence store contract
//!
//! The workflow only reads from the store; ingestion and indexing are the
//! backend's concern.

use std::fmt::Debug;

use async_trait::async_trait;

use super::error::DomainError;
use super::passage::Passage;
use super::query::CollectionId;

/// Read-side contract of the evidence backend
///
/// Implementations return passages ordered most-relevant-first, at most
/// `k` of them. Zero results is an empty `Ok`, never an error.
#[async_trait]
pub trait EvidenceStore: Send + Sync + Debug {
    /// Search a collection for candidate passages
    async fn search(
        &self,
        query_text: &str,
        collection: &CollectionId,
        k: u32,
    ) -> Result<Vec<Passage>, DomainError>;

    /// Get the backend name
    fn store_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock evidence store for testing
    #[derive(Debug)]
    pub struct MockEvidenceStore {
        results: Mutex<Vec<Passage>>,
        error: Option<String>,
        search_count: AtomicUsize,
    }

    impl MockEvidenceStore {
        pub fn new() -> Self {
            Self {
                results: Mutex::new(Vec::new()),
                error: None,
                search_count: AtomicUsize::new(0),
            }
        }

        /// Fixed passages returned for every search
        pub fn with_results(self, results: Vec<Passage>) -> Self {
            *self.results.lock().unwrap() = results;
            self
        }

        /// Fail every search with this error
        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn search_count(&self) -> usize {
            self.search_count.load(Ordering::SeqCst)
        }
    }

    impl Default for MockEvidenceStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl EvidenceStore for MockEvidenceStore {
        async fn search(
            &self,
            _query_text: &str,
            _collection: &CollectionId,
            k: u32,
        ) -> Result<Vec<Passage>, DomainError> {
            self.search_count.fetch_add(1, Ordering::SeqCst);

            if let Some(ref error) = self.error {
                return Err(DomainError::evidence(error));
            }

            let results = self.results.lock().unwrap();
            Ok(results.iter().take(k as usize).cloned().collect())
        }

        fn store_name(&self) -> &'static str {
            "mock"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_store_returns_at_most_k() {
            let store = MockEvidenceStore::new().with_results(vec![
                Passage::local("one", "doc-1"),
                Passage::local("two", "doc-2"),
                Passage::local("three", "doc-3"),
            ]);

            let collection = CollectionId::new("articles").unwrap();
            let results = store.search("query", &collection, 2).await.unwrap();

            assert_eq!(results.len(), 2);
            assert_eq!(store.search_count(), 1);
        }

        #[tokio::test]
        async fn test_mock_store_zero_results_is_ok() {
            let store = MockEvidenceStore::new();
            let collection = CollectionId::new("articles").unwrap();

            let results = store.search("query", &collection, 4).await.unwrap();
            assert!(results.is_empty());
        }

        #[tokio::test]
        async fn test_mock_store_error() {
            let store = MockEvidenceStore::new().with_error("backend down");
            let collection = CollectionId::new("articles").unwrap();

            assert!(store.search("query", &collection, 4).await.is_err());
        }
    }
}
