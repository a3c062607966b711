// src/handlers/questions.rs

use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use serde_json::json;

use crate::{
    auth,
    error::AppError,
    models::question::summarize_domains,
    state::AppState,
    utils::jwt::bearer_token,
};

/// Returns the whole question bank in ascending id order.
///
/// A bearer token is optional; an invalid one only flips `authenticated` to
/// false.
pub async fn list_questions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let subject = auth::optional_subject(state.verifier.as_ref(), bearer_token(&headers)).await;

    let questions = state
        .store
        .list_questions()
        .await
        .map_err(|e| e.upstream("Failed to fetch questions", state.config.environment))?;

    Ok(Json(json!({
        "success": true,
        "count": questions.len(),
        "data": questions,
        "authenticated": subject.is_some(),
    })))
}

/// Lists domain tags with their question counts.
pub async fn list_domains(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let questions = state
        .store
        .list_questions()
        .await
        .map_err(|e| e.upstream("Failed to fetch domains", state.config.environment))?;

    let domains = summarize_domains(&questions);

    Ok(Json(json!({
        "success": true,
        "count": domains.len(),
        "data": domains,
    })))
}
