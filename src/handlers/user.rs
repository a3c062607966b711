// src/handlers/user.rs

use axum::{Extension, Json, body::Bytes, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    auth::Subject,
    error::AppError,
    models::user::{OnConflict, UpsertUserRequest, UserProfile},
    state::AppState,
    store,
    utils::html::clean_html,
};

/// Creates or updates the caller's user row, keyed by the verified subject.
pub async fn upsert_user(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: UpsertUserRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid JSON in request body".to_string()))?;
    let payload = payload.normalized();

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let Some(email) = payload.email else {
        return Err(AppError::BadRequest("Email is required".to_string()));
    };

    let profile = UserProfile {
        email: clean_html(&email),
        name: payload.name.as_deref().map(clean_html),
    };

    let user = store::upsert_user(state.store.as_ref(), &subject.id, &profile, OnConflict::Update)
        .await
        .map_err(|e| e.upstream("Failed to create/update user", state.config.environment))?;

    Ok(Json(json!({
        "success": true,
        "data": user,
        "message": "User created/updated successfully",
    })))
}
