//! v1 API endpoints

pub mod answers;

use axum::{routing::post, Router};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new().route("/answers", post(answers::create_answer))
}
