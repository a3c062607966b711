// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::config::Environment;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 500 with a route-specific message; `detail` is only set outside production.
    Upstream {
        message: String,
        detail: Option<String>,
    },

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 405 Method Not Allowed
    MethodNotAllowed,

    // 409 Conflict (e.g., email already owned by another user)
    Conflict(String),
}

impl AppError {
    /// Rewrites an internal failure into an `Upstream` error carrying `message`.
    /// Client-facing variants pass through untouched.
    pub fn upstream(self, message: &str, environment: Environment) -> Self {
        match self {
            AppError::InternalServerError(detail) => {
                tracing::error!("{}: {}", message, detail);
                AppError::Upstream {
                    message: message.to_string(),
                    detail: (!environment.is_production()).then_some(detail),
                }
            }
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) | AppError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a `{ success: false, error }` JSON body with the
/// matching HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                json!({ "success": false, "error": "Internal Server Error" })
            }
            AppError::Upstream { message, detail } => match detail {
                Some(detail) => json!({ "success": false, "error": message, "message": detail }),
                None => json!({ "success": false, "error": message }),
            },
            AppError::MethodNotAllowed => {
                json!({ "success": false, "error": "Method not allowed" })
            }
            AppError::BadRequest(msg)
            | AppError::AuthError(msg)
            | AppError::Conflict(msg) => json!({ "success": false, "error": msg }),
        };

        (status, Json(body)).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
