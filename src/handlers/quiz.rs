// src/handlers/quiz.rs

use axum::{Json, body::Bytes, extract::State, http::HeaderMap, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError, services::SubmissionPipeline, state::AppState, utils::jwt::bearer_token,
};

/// Saves a finished quiz: one attempt row plus one row per answer.
///
/// The body is read raw so that malformed JSON gets the same
/// `{ success: false }` envelope as every other client error.
pub async fn submit_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let pipeline = SubmissionPipeline::new(state.store.as_ref(), state.authenticator.as_ref());

    let outcome = pipeline
        .submit(bearer_token(&headers), &body)
        .await
        .map_err(|e| e.upstream("Failed to save quiz results", state.config.environment))?;

    Ok(Json(json!({
        "success": true,
        "data": outcome,
        "message": "Quiz results saved successfully",
    })))
}
