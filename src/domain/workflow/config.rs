//! Workflow configuration
//!
//! Constructed once at process start and passed by reference into the
//! orchestrator; workflow logic never reads ambient configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Thresholds and bounds governing the workflow's decision policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Minimum relevance score (0-10 local scale) for a passage to be kept
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
    /// Total generation attempts allowed before escalation, including the
    /// first. Grounding and quality failures share this budget.
    #[serde(default = "default_max_generation_retries")]
    pub max_generation_retries: u32,
    /// Maximum web search invocations per query lifecycle
    #[serde(default = "default_websearch_max_uses")]
    pub websearch_max_uses: u32,
    /// Retrieval fan-out (k)
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: u32,
    /// Per-call timeout for every external call, in milliseconds
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    /// Immediate retries for a failed generation call, same inputs
    #[serde(default = "default_gen_retry_limit")]
    pub gen_retry_limit: u32,
    /// Fail the grading phase after this many consecutive per-passage
    /// failures. Unset: fail only when every passage in the batch failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading_failure_threshold: Option<u32>,
}

fn default_relevance_threshold() -> f32 {
    8.0
}

fn default_max_generation_retries() -> u32 {
    2
}

fn default_websearch_max_uses() -> u32 {
    1
}

fn default_retrieval_top_k() -> u32 {
    4
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

fn default_gen_retry_limit() -> u32 {
    1
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: default_relevance_threshold(),
            max_generation_retries: default_max_generation_retries(),
            websearch_max_uses: default_websearch_max_uses(),
            retrieval_top_k: default_retrieval_top_k(),
            call_timeout_ms: default_call_timeout_ms(),
            gen_retry_limit: default_gen_retry_limit(),
            grading_failure_threshold: None,
        }
    }
}

impl WorkflowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relevance_threshold(mut self, threshold: f32) -> Self {
        self.relevance_threshold = threshold.clamp(0.0, 10.0);
        self
    }

    pub fn with_max_generation_retries(mut self, retries: u32) -> Self {
        self.max_generation_retries = retries;
        self
    }

    pub fn with_websearch_max_uses(mut self, uses: u32) -> Self {
        self.websearch_max_uses = uses;
        self
    }

    pub fn with_retrieval_top_k(mut self, k: u32) -> Self {
        self.retrieval_top_k = k;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_gen_retry_limit(mut self, limit: u32) -> Self {
        self.gen_retry_limit = limit;
        self
    }

    pub fn with_grading_failure_threshold(mut self, threshold: u32) -> Self {
        self.grading_failure_threshold = Some(threshold);
        self
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkflowConfig::default();

        assert_eq!(config.relevance_threshold, 8.0);
        assert_eq!(config.max_generation_retries, 2);
        assert_eq!(config.websearch_max_uses, 1);
        assert_eq!(config.retrieval_top_k, 4);
        assert_eq!(config.call_timeout(), Duration::from_secs(30));
        assert_eq!(config.gen_retry_limit, 1);
        assert!(config.grading_failure_threshold.is_none());
    }

    #[test]
    fn test_builder() {
        let config = WorkflowConfig::new()
            .with_relevance_threshold(7.0)
            .with_max_generation_retries(3)
            .with_websearch_max_uses(2)
            .with_retrieval_top_k(8)
            .with_gen_retry_limit(0)
            .with_grading_failure_threshold(2);

        assert_eq!(config.relevance_threshold, 7.0);
        assert_eq!(config.max_generation_retries, 3);
        assert_eq!(config.websearch_max_uses, 2);
        assert_eq!(config.retrieval_top_k, 8);
        assert_eq!(config.gen_retry_limit, 0);
        assert_eq!(config.grading_failure_threshold, Some(2));
    }

    #[test]
    fn test_threshold_clamped() {
        let config = WorkflowConfig::new().with_relevance_threshold(15.0);
        assert_eq!(config.relevance_threshold, 10.0);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: WorkflowConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.relevance_threshold, 8.0);
        assert_eq!(config.retrieval_top_k, 4);
    }
}
