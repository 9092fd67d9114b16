//! Answer endpoint
//!
//! Runs the full validation workflow for one question and returns the
//! terminal envelope, including provenance and the verified flag.

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::query::{ChatTurn, CollectionId, Query};
use crate::domain::workflow::AnswerEnvelope;

/// Request body for `POST /v1/answers`
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1, max = 4096))]
    pub question: String,
    /// Target collection; the configured default when omitted
    pub collection_id: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

/// One prior exchange supplied by the caller
#[derive(Debug, Deserialize)]
pub struct HistoryTurn {
    pub user: String,
    pub assistant: String,
}

pub async fn create_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerEnvelope>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::invalid_request(e.to_string()))?;

    let collection = match request.collection_id {
        Some(id) => CollectionId::new(id)
            .map_err(|e| ApiError::invalid_request(e.to_string()))?,
        None => state.default_collection.clone(),
    };

    let history: Vec<ChatTurn> = request
        .history
        .into_iter()
        .map(|turn| ChatTurn::new(turn.user, turn.assistant))
        .collect();

    let query = Query::new(request.question, collection)
        .map_err(|e| ApiError::invalid_request(e.to_string()))?
        .with_history(history);

    let envelope = state.workflow.answer(query).await?;

    Ok(Json(envelope))
}
