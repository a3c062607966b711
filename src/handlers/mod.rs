// src/handlers/mod.rs

pub mod questions;
pub mod quiz;
pub mod user;

use crate::error::AppError;

/// Fallback for unsupported methods on a known path.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
