//! Workflow orchestrator
//!
//! Drives one query through the state machine. The orchestrator owns all
//! counters, is the single writer of `WorkflowState`, applies the per-call
//! timeout and one immediate low-level retry to every external call, and
//! checks for cancellation at each phase boundary.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::config::WorkflowConfig;
use super::envelope::AnswerEnvelope;
use super::error::WorkflowError;
use super::state::{CancellationFlag, Phase, TerminationReason, WorkflowState};
use super::transition::transition;
use crate::domain::evidence::EvidenceStore;
use crate::domain::generation::{AnswerGenerator, Draft};
use crate::domain::grading::{RelevanceGrade, RelevanceGrader, SufficiencyGate};
use crate::domain::passage::{GradedPassage, Passage, RelevanceScore};
use crate::domain::query::Query;
use crate::domain::validation::{GroundingValidator, QualityValidator, ValidationVerdict};
use crate::domain::websearch::WebSearchProvider;
use crate::domain::DomainError;

/// Hard ceiling on phase transitions per query. The bounded retry policy
/// keeps real runs far below this; the guard only catches a broken edge.
const MAX_PHASE_STEPS: usize = 100;

/// The workflow orchestrator: one instance serves many queries, each with
/// its own isolated `WorkflowState`
#[derive(Debug)]
pub struct AnswerWorkflow {
    evidence: Arc<dyn EvidenceStore>,
    grader: Arc<dyn RelevanceGrader>,
    generator: Arc<dyn AnswerGenerator>,
    grounding: Arc<dyn GroundingValidator>,
    quality: Arc<dyn QualityValidator>,
    websearch: Arc<dyn WebSearchProvider>,
    config: WorkflowConfig,
}

impl AnswerWorkflow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        evidence: Arc<dyn EvidenceStore>,
        grader: Arc<dyn RelevanceGrader>,
        generator: Arc<dyn AnswerGenerator>,
        grounding: Arc<dyn GroundingValidator>,
        quality: Arc<dyn QualityValidator>,
        websearch: Arc<dyn WebSearchProvider>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            evidence,
            grader,
            generator,
            grounding,
            quality,
            websearch,
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Answer a query, running the workflow to its terminal state
    pub async fn answer(&self, query: Query) -> Result<AnswerEnvelope, WorkflowError> {
        self.answer_with_cancellation(query, &CancellationFlag::new())
            .await
    }

    /// Answer a query with cooperative cancellation. After `cancel` is
    /// set, no further phase calls are issued and in-flight results are
    /// discarded.
    pub async fn answer_with_cancellation(
        &self,
        query: Query,
        cancel: &CancellationFlag,
    ) -> Result<AnswerEnvelope, WorkflowError> {
        info!(
            question = query.question(),
            collection = %query.collection(),
            "Starting answer workflow"
        );

        let mut state = WorkflowState::new(query);
        let mut steps = 0usize;

        while state.phase != Phase::Done {
            if cancel.is_cancelled() {
                info!("Workflow cancelled at phase boundary '{}'", state.phase);
                return Err(WorkflowError::Cancelled);
            }

            steps += 1;
            if steps > MAX_PHASE_STEPS {
                return Err(WorkflowError::internal(format!(
                    "exceeded {} phase transitions",
                    MAX_PHASE_STEPS
                )));
            }

            match state.phase {
                Phase::Retrieve => self.run_retrieve(&mut state).await?,
                Phase::Grade => self.run_grade(&mut state).await?,
                Phase::Generate => self.run_generate(&mut state).await?,
                Phase::WebSearch => self.run_websearch(&mut state).await?,
                Phase::ValidateGrounding => self.run_validate_grounding(&mut state).await?,
                Phase::ValidateQuality => self.run_validate_quality(&mut state).await?,
                Phase::Done => unreachable!("loop exits on DONE"),
            }

            let next = transition(&state, &self.config);

            // Bound exhaustion is a defined terminal outcome, not an error:
            // record it so the envelope can explain the low confidence
            if next == Phase::Done
                && state.termination.is_none()
                && !state.verdict.map(|v| v.is_verified()).unwrap_or(false)
            {
                state.termination = Some(TerminationReason::RetriesExhausted);
            }

            debug!("Phase transition: {} -> {}", state.phase, next);
            state.phase = next;
        }

        let draft = state
            .draft
            .as_ref()
            .ok_or_else(|| WorkflowError::internal("workflow reached DONE without a draft"))?;

        let envelope = AnswerEnvelope::from_draft(
            draft,
            state.verdict,
            state.web_search_used(),
            state.generation_attempts,
            state.termination,
        );

        info!(
            verified = envelope.verified,
            web_search_used = envelope.web_search_used,
            generation_attempts = envelope.generation_attempts,
            "Workflow complete"
        );

        Ok(envelope)
    }

    /// Wrap an external call with the configured per-call timeout. A
    /// timeout is a call failure, never a silent success.
    async fn with_timeout<T>(
        &self,
        provider: &'static str,
        fut: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        let timeout = self.config.call_timeout();
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::timeout(provider, timeout.as_millis() as u64)),
        }
    }

    async fn run_retrieve(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        let question = state.query.question();
        let collection = state.query.collection();
        let k = self.config.retrieval_top_k;

        let result = self
            .with_timeout("evidence", self.evidence.search(question, collection, k))
            .await;

        let passages = match result {
            Ok(passages) => passages,
            Err(e) if e.is_transient() => {
                warn!("Evidence search failed, retrying once: {}", e);
                self.with_timeout("evidence", self.evidence.search(question, collection, k))
                    .await
                    .map_err(|e| WorkflowError::phase_failed(Phase::Retrieve, e))?
            }
            Err(e) => return Err(WorkflowError::phase_failed(Phase::Retrieve, e)),
        };

        debug!("Retrieved {} candidate passages", passages.len());
        state.retrieved = passages;
        Ok(())
    }

    async fn run_grade(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        let question = state.query.question();
        let batch_size = state.retrieved.len();

        let mut graded = Vec::with_capacity(batch_size);
        let mut failed = 0usize;
        let mut consecutive_failures = 0u32;

        for passage in &state.retrieved {
            match self.grade_one(question, passage).await {
                Ok(grade) => {
                    consecutive_failures = 0;
                    let mut scored = GradedPassage::local(passage.clone(), grade.score);
                    if let Some(reason) = grade.reason {
                        scored = scored.with_reason(reason);
                    }
                    graded.push(scored);
                }
                Err(e) => {
                    failed += 1;
                    consecutive_failures += 1;
                    warn!(
                        source = %passage.source,
                        "Grading failed, scoring passage least relevant: {}", e
                    );
                    graded.push(
                        GradedPassage::local(passage.clone(), RelevanceScore::local_minimum().value())
                            .with_reason(format!("grading failed: {}", e)),
                    );

                    if let Some(threshold) = self.config.grading_failure_threshold {
                        if consecutive_failures >= threshold {
                            return Err(WorkflowError::phase_failed(Phase::Grade, e));
                        }
                    }
                }
            }
        }

        if batch_size > 0 && failed == batch_size {
            return Err(WorkflowError::phase_failed(
                Phase::Grade,
                DomainError::internal("relevance grading failed for every passage in the batch"),
            ));
        }

        let gate = SufficiencyGate::new(self.config.relevance_threshold);
        let outcome = gate.apply(graded);

        info!(
            kept = outcome.kept.len(),
            discarded = outcome.discarded,
            decision = ?outcome.decision,
            "Sufficiency gate applied"
        );

        state.passages = outcome.kept;
        Ok(())
    }

    async fn grade_one(
        &self,
        question: &str,
        passage: &Passage,
    ) -> Result<RelevanceGrade, DomainError> {
        match self
            .with_timeout("grader", self.grader.grade(question, passage))
            .await
        {
            Err(e) if e.is_transient() => {
                debug!(source = %passage.source, "Grading call retry: {}", e);
                self.with_timeout("grader", self.grader.grade(question, passage))
                    .await
            }
            other => other,
        }
    }

    async fn run_generate(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        state.generation_attempts += 1;
        let attempt = state.generation_attempts;

        info!(
            attempt,
            passages = state.passages.len(),
            "Generating draft answer"
        );

        let mut call_failures = 0u32;
        let answer_text = loop {
            let result = self
                .with_timeout(
                    "generator",
                    self.generator.generate(&state.query, &state.passages),
                )
                .await;

            match result {
                Ok(text) => break text,
                Err(e) => {
                    call_failures += 1;
                    if call_failures > self.config.gen_retry_limit || !e.is_transient() {
                        return Err(WorkflowError::phase_failed(Phase::Generate, e));
                    }
                    warn!("Generation call failed, retrying with the same inputs: {}", e);
                }
            }
        };

        state.draft = Some(Draft::new(answer_text, state.passages.clone(), attempt));
        state.verdict = None;
        Ok(())
    }

    async fn run_websearch(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        state.websearch_uses += 1;
        let question = state.query.question();

        info!(invocation = state.websearch_uses, "Falling back to web search");

        let result = match self
            .with_timeout("websearch", self.websearch.search(question))
            .await
        {
            Err(e) if e.is_transient() => {
                warn!("Web search failed, retrying once: {}", e);
                self.with_timeout("websearch", self.websearch.search(question))
                    .await
            }
            other => other,
        };

        match result {
            Ok(hits) => {
                debug!("Web search returned {} hits", hits.len());
                state
                    .passages
                    .extend(hits.into_iter().map(|hit| hit.into_graded_passage()));
                Ok(())
            }
            Err(e) if state.draft.is_some() => {
                // Escalation path: a draft already exists, so terminate
                // with it flagged unverified rather than losing the answer
                warn!("Web search escalation failed, terminating unverified: {}", e);
                state.termination = Some(TerminationReason::WebSearchFailed);
                Ok(())
            }
            Err(e) => Err(WorkflowError::phase_failed(Phase::WebSearch, e)),
        }
    }

    async fn run_validate_grounding(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        let draft = state.draft.as_ref().ok_or_else(|| {
            WorkflowError::phase_failed(
                Phase::ValidateGrounding,
                DomainError::internal("no draft to validate"),
            )
        })?;

        let result = match self
            .with_timeout("grounding_validator", self.grounding.is_grounded(draft))
            .await
        {
            Err(e) if e.is_transient() => {
                debug!("Grounding validation retry: {}", e);
                self.with_timeout("grounding_validator", self.grounding.is_grounded(draft))
                    .await
            }
            other => other,
        };

        let grounded = match result {
            Ok(grounded) => grounded,
            Err(e) => {
                // Fail closed: a draft we could not validate is never
                // presented as verified
                warn!("Grounding validation call failed, treating draft as ungrounded: {}", e);
                false
            }
        };

        info!(grounded, attempt = draft.attempt, "Grounding validated");

        state.verdict = Some(ValidationVerdict {
            grounded,
            addresses_question: false,
        });
        Ok(())
    }

    async fn run_validate_quality(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        let question = state.query.question();
        let draft = state.draft.as_ref().ok_or_else(|| {
            WorkflowError::phase_failed(
                Phase::ValidateQuality,
                DomainError::internal("no draft to validate"),
            )
        })?;

        let result = match self
            .with_timeout(
                "quality_validator",
                self.quality.addresses_question(question, draft),
            )
            .await
        {
            Err(e) if e.is_transient() => {
                debug!("Quality validation retry: {}", e);
                self.with_timeout(
                    "quality_validator",
                    self.quality.addresses_question(question, draft),
                )
                .await
            }
            other => other,
        };

        let addresses_question = match result {
            Ok(addresses) => addresses,
            Err(e) => {
                warn!("Quality validation call failed, treating draft as off-topic: {}", e);
                false
            }
        };

        info!(
            addresses_question,
            attempt = draft.attempt,
            "Quality validated"
        );

        state.verdict = Some(ValidationVerdict {
            grounded: true,
            addresses_question,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    use crate::domain::evidence::mock::MockEvidenceStore;
    use crate::domain::generation::mock::MockAnswerGenerator;
    use crate::domain::grading::MockRelevanceGrader;
    use crate::domain::passage::PassageOrigin;
    use crate::domain::query::{ChatTurn, CollectionId};
    use crate::domain::validation::mock::{MockGroundingValidator, MockQualityValidator};
    use crate::domain::websearch::mock::MockWebSearchProvider;
    use crate::domain::websearch::WebSearchHit;

    fn query() -> Query {
        Query::new(
            "What is the capital of France?",
            CollectionId::new("articles").unwrap(),
        )
        .unwrap()
        .with_history(vec![ChatTurn::new("Hi", "Hello! How can I help?")])
    }

    fn four_passages() -> Vec<Passage> {
        vec![
            Passage::local("Paris is the capital of France.", "doc-1"),
            Passage::local("France's capital city is Paris.", "doc-2"),
            Passage::local("The Rhine flows through Germany.", "doc-3"),
            Passage::local("Madrid is the capital of Spain.", "doc-4"),
        ]
    }

    fn web_hits() -> Vec<WebSearchHit> {
        vec![
            WebSearchHit::new(
                "Paris - Encyclopedia",
                "https://en.example.org/Paris",
                "Paris is the capital and largest city of France.",
                0.95,
            ),
            WebSearchHit::new(
                "France facts",
                "https://facts.example.org/france",
                "The capital of France is Paris.",
                0.88,
            ),
        ]
    }

    struct Fixture {
        evidence: Arc<MockEvidenceStore>,
        grader: Arc<MockRelevanceGrader>,
        generator: Arc<MockAnswerGenerator>,
        grounding: Arc<MockGroundingValidator>,
        quality: Arc<MockQualityValidator>,
        websearch: Arc<MockWebSearchProvider>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                evidence: Arc::new(MockEvidenceStore::new().with_results(four_passages())),
                grader: Arc::new(
                    MockRelevanceGrader::new()
                        .with_score_for("doc-1", 9.0)
                        .with_score_for("doc-2", 8.0)
                        .with_score_for("doc-3", 2.0)
                        .with_score_for("doc-4", 1.0),
                ),
                generator: Arc::new(MockAnswerGenerator::new(
                    "Paris is the capital of France.",
                )),
                grounding: Arc::new(MockGroundingValidator::always(true)),
                quality: Arc::new(MockQualityValidator::always(true)),
                websearch: Arc::new(MockWebSearchProvider::new().with_hits(web_hits())),
            }
        }

        fn workflow(&self, config: WorkflowConfig) -> AnswerWorkflow {
            AnswerWorkflow::new(
                self.evidence.clone(),
                self.grader.clone(),
                self.generator.clone(),
                self.grounding.clone(),
                self.quality.clone(),
                self.websearch.clone(),
                config,
            )
        }
    }

    #[tokio::test]
    async fn test_happy_path_two_kept_passages() {
        let fixture = Fixture::new();
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        assert!(envelope.verified);
        assert!(!envelope.web_search_used);
        assert_eq!(envelope.generation_attempts, 1);
        assert_eq!(envelope.passages_used.len(), 2);
        assert_eq!(envelope.passages_used[0].passage.source, "doc-1");
        assert_eq!(envelope.passages_used[1].passage.source, "doc-2");
        assert!(envelope.failure_reason.is_none());

        assert_eq!(fixture.generator.call_count(), 1);
        assert_eq!(fixture.websearch.search_count(), 0);
        assert_eq!(fixture.grounding.call_count(), 1);
        assert_eq!(fixture.quality.call_count(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_local_evidence_routes_to_web_search() {
        let mut fixture = Fixture::new();
        fixture.grader = Arc::new(MockRelevanceGrader::new().with_fixed_score(3.0));
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        assert!(envelope.verified);
        assert!(envelope.web_search_used);
        assert_eq!(fixture.websearch.search_count(), 1);
        // Generation ran once, from web passages only
        assert_eq!(fixture.generator.call_count(), 1);
        assert_eq!(envelope.passages_used.len(), 2);
        assert!(envelope
            .passages_used
            .iter()
            .all(|p| p.origin() == PassageOrigin::Web));
    }

    #[tokio::test]
    async fn test_zero_retrieved_passages_routes_to_web_search() {
        let mut fixture = Fixture::new();
        fixture.evidence = Arc::new(MockEvidenceStore::new());
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        assert!(envelope.web_search_used);
        assert_eq!(fixture.grader.call_count(), 0);
        assert_eq!(fixture.websearch.search_count(), 1);
    }

    #[tokio::test]
    async fn test_grounding_failure_exhausts_budget_then_escalates() {
        let mut fixture = Fixture::new();
        fixture.grounding = Arc::new(MockGroundingValidator::always(false));
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        assert!(!envelope.verified);
        assert!(envelope.web_search_used);
        // Two local attempts, one post-escalation attempt
        assert_eq!(envelope.generation_attempts, 3);
        assert_eq!(
            envelope.failure_reason,
            Some(TerminationReason::RetriesExhausted)
        );
        // Escalation exclusivity: exactly one web search despite endless
        // grounding failures
        assert_eq!(fixture.websearch.search_count(), 1);
        assert_eq!(fixture.quality.call_count(), 0);
    }

    #[tokio::test]
    async fn test_quality_failure_shares_the_retry_budget() {
        let mut fixture = Fixture::new();
        fixture.quality = Arc::new(MockQualityValidator::always(false));
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        assert!(!envelope.verified);
        assert_eq!(envelope.generation_attempts, 3);
        assert_eq!(fixture.websearch.search_count(), 1);
        // Grounding passed every time, so quality was consulted each round
        assert_eq!(fixture.grounding.call_count(), 3);
        assert_eq!(fixture.quality.call_count(), 3);
        assert!(envelope.verdict.unwrap().grounded);
        assert!(!envelope.verdict.unwrap().addresses_question);
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_second_generation() {
        let mut fixture = Fixture::new();
        fixture.grounding =
            Arc::new(MockGroundingValidator::always(true).with_scripted(vec![false]));
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        assert!(envelope.verified);
        assert!(!envelope.web_search_used);
        assert_eq!(envelope.generation_attempts, 2);
    }

    #[tokio::test]
    async fn test_escalation_merges_web_hits_with_kept_passages() {
        let mut fixture = Fixture::new();
        // Fail both local attempts, pass once web evidence is added
        fixture.grounding =
            Arc::new(MockGroundingValidator::always(true).with_scripted(vec![false, false]));
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        assert!(envelope.verified);
        assert!(envelope.web_search_used);
        assert_eq!(envelope.generation_attempts, 3);
        // Kept local passages plus appended web passages
        assert_eq!(envelope.passages_used.len(), 4);
        assert_eq!(
            envelope
                .passages_used
                .iter()
                .filter(|p| p.origin() == PassageOrigin::Local)
                .count(),
            2
        );
        assert_eq!(
            envelope
                .passages_used
                .iter()
                .filter(|p| p.origin() == PassageOrigin::Web)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_provenance_preserved_on_unverified_path() {
        let mut fixture = Fixture::new();
        fixture.grounding = Arc::new(MockGroundingValidator::always(false));
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        // The reported draft was generated after escalation: 2 kept local
        // passages plus 2 web hits
        assert_eq!(envelope.passages_used.len(), 4);
        assert_eq!(envelope.answer_text, "Paris is the capital of France.");
    }

    #[tokio::test]
    async fn test_generation_transient_failure_retried_at_call_level() {
        let mut fixture = Fixture::new();
        fixture.generator = Arc::new(
            MockAnswerGenerator::new("Paris.").with_failures_before_success(1),
        );
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        assert!(envelope.verified);
        // One failed call plus the immediate retry, one semantic attempt
        assert_eq!(fixture.generator.call_count(), 2);
        assert_eq!(envelope.generation_attempts, 1);
    }

    #[tokio::test]
    async fn test_generation_persistent_failure_is_fatal() {
        let mut fixture = Fixture::new();
        fixture.generator = Arc::new(MockAnswerGenerator::new("x").with_error("model down"));
        let workflow = fixture.workflow(WorkflowConfig::default());

        let result = workflow.answer(query()).await;

        assert!(matches!(
            result,
            Err(WorkflowError::PhaseFailed {
                phase: Phase::Generate,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_websearch_failure_on_sufficiency_path_is_fatal() {
        let mut fixture = Fixture::new();
        fixture.grader = Arc::new(MockRelevanceGrader::new().with_fixed_score(1.0));
        fixture.websearch = Arc::new(MockWebSearchProvider::new().with_error("quota exceeded"));
        let workflow = fixture.workflow(WorkflowConfig::default());

        let result = workflow.answer(query()).await;

        assert!(matches!(
            result,
            Err(WorkflowError::PhaseFailed {
                phase: Phase::WebSearch,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_websearch_failure_on_escalation_keeps_last_draft() {
        let mut fixture = Fixture::new();
        fixture.grounding = Arc::new(MockGroundingValidator::always(false));
        fixture.websearch = Arc::new(MockWebSearchProvider::new().with_error("quota exceeded"));
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        assert!(!envelope.verified);
        assert_eq!(
            envelope.failure_reason,
            Some(TerminationReason::WebSearchFailed)
        );
        assert_eq!(envelope.answer_text, "Paris is the capital of France.");
        assert_eq!(envelope.generation_attempts, 2);
        // The reported draft is the last local one, with its passages
        assert!(envelope
            .passages_used
            .iter()
            .all(|p| p.origin() == PassageOrigin::Local));
    }

    #[tokio::test]
    async fn test_grading_failure_for_one_passage_does_not_abort_batch() {
        let mut fixture = Fixture::new();
        fixture.grader = Arc::new(
            MockRelevanceGrader::new()
                .with_score_for("doc-1", 9.0)
                .with_fixed_score(1.0)
                .with_failure_for("doc-2"),
        );
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        assert!(envelope.verified);
        // The failed passage scored 0.0 and was discarded by the gate
        assert_eq!(envelope.passages_used.len(), 1);
        assert_eq!(envelope.passages_used[0].passage.source, "doc-1");
    }

    #[tokio::test]
    async fn test_grading_failure_for_every_passage_fails_the_phase() {
        let mut fixture = Fixture::new();
        fixture.grader = Arc::new(MockRelevanceGrader::new().with_all_failing());
        let workflow = fixture.workflow(WorkflowConfig::default());

        let result = workflow.answer(query()).await;

        assert!(matches!(
            result,
            Err(WorkflowError::PhaseFailed {
                phase: Phase::Grade,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_grading_consecutive_failure_threshold() {
        let mut fixture = Fixture::new();
        fixture.grader = Arc::new(
            MockRelevanceGrader::new()
                .with_fixed_score(9.0)
                .with_failure_for("doc-3")
                .with_failure_for("doc-4"),
        );
        let config = WorkflowConfig::default().with_grading_failure_threshold(2);
        let workflow = fixture.workflow(config);

        let result = workflow.answer(query()).await;

        assert!(matches!(
            result,
            Err(WorkflowError::PhaseFailed {
                phase: Phase::Grade,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_validator_call_failure_fails_closed() {
        let mut fixture = Fixture::new();
        fixture.grounding = Arc::new(MockGroundingValidator::always(true).with_error("down"));
        let workflow = fixture.workflow(WorkflowConfig::default());

        let envelope = workflow.answer(query()).await.unwrap();

        // Never presented as verified, and the policy stays bounded
        assert!(!envelope.verified);
        assert_eq!(envelope.generation_attempts, 3);
        assert_eq!(fixture.websearch.search_count(), 1);
        assert_eq!(
            envelope.failure_reason,
            Some(TerminationReason::RetriesExhausted)
        );
    }

    #[tokio::test]
    async fn test_cancellation_before_first_phase() {
        let fixture = Fixture::new();
        let workflow = fixture.workflow(WorkflowConfig::default());

        let cancel = CancellationFlag::new();
        cancel.cancel();

        let result = workflow.answer_with_cancellation(query(), &cancel).await;

        assert!(matches!(result, Err(WorkflowError::Cancelled)));
        assert_eq!(fixture.evidence.search_count(), 0);
    }

    #[tokio::test]
    async fn test_termination_bound_with_larger_budgets() {
        let mut fixture = Fixture::new();
        fixture.grounding = Arc::new(MockGroundingValidator::always(false));
        let config = WorkflowConfig::default()
            .with_max_generation_retries(4)
            .with_websearch_max_uses(2);
        let workflow = fixture.workflow(config);

        let envelope = workflow.answer(query()).await.unwrap();

        // attempts <= max_generation_retries + websearch_max_uses
        assert_eq!(envelope.generation_attempts, 6);
        assert_eq!(fixture.websearch.search_count(), 2);
        assert!(!envelope.verified);
    }

    #[tokio::test]
    async fn test_deterministic_grading_reproduces_gate_decision() {
        let fixture = Fixture::new();
        let workflow = fixture.workflow(WorkflowConfig::default());

        let first = workflow.answer(query()).await.unwrap();
        let second = workflow.answer(query()).await.unwrap();

        let sources = |envelope: &AnswerEnvelope| {
            envelope
                .passages_used
                .iter()
                .map(|p| p.passage.source.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(sources(&first), sources(&second));
    }

    #[derive(Debug)]
    struct HangingEvidenceStore;

    #[async_trait]
    impl EvidenceStore for HangingEvidenceStore {
        async fn search(
            &self,
            _query_text: &str,
            _collection: &CollectionId,
            _k: u32,
        ) -> Result<Vec<Passage>, DomainError> {
            futures::future::pending::<()>().await;
            unreachable!()
        }

        fn store_name(&self) -> &'static str {
            "hanging"
        }
    }

    #[tokio::test]
    async fn test_call_timeout_is_a_phase_failure() {
        let fixture = Fixture::new();
        let workflow = AnswerWorkflow::new(
            Arc::new(HangingEvidenceStore),
            fixture.grader.clone(),
            fixture.generator.clone(),
            fixture.grounding.clone(),
            fixture.quality.clone(),
            fixture.websearch.clone(),
            WorkflowConfig::default().with_call_timeout(Duration::from_millis(20)),
        );

        let result = workflow.answer(query()).await;

        assert!(matches!(
            result,
            Err(WorkflowError::PhaseFailed {
                phase: Phase::Retrieve,
                source: DomainError::Timeout { .. },
            })
        ));
    }
}
