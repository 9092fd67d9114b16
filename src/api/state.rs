//! Application state for shared services

use std::sync::Arc;

use crate::domain::evidence::EvidenceStore;
use crate::domain::query::CollectionId;
use crate::domain::workflow::AnswerWorkflow;

/// Shared state behind every handler
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<AnswerWorkflow>,
    /// Direct handle to the evidence store for readiness probes
    pub evidence: Arc<dyn EvidenceStore>,
    /// Collection used when a request does not name one
    pub default_collection: CollectionId,
}

impl AppState {
    pub fn new(
        workflow: Arc<AnswerWorkflow>,
        evidence: Arc<dyn EvidenceStore>,
        default_collection: CollectionId,
    ) -> Self {
        Self {
            workflow,
            evidence,
            default_collection,
        }
    }
}
