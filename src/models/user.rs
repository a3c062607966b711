// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validation::{validate_display_name, validate_email_format};

/// Represents the 'users' table in the database.
/// `id` is the subject identifier handed out by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Profile fields written by an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
}

impl UserProfile {
    /// Placeholder profile used when a submission arrives for a subject that
    /// has never called `POST /api/user`.
    pub fn placeholder(subject: &str) -> Self {
        Self {
            email: format!("{subject}@example.com"),
            name: Some("Quiz Participant".to_string()),
        }
    }
}

/// What an upsert does when the row already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    /// Overwrite email and name.
    Update,
    /// Leave the existing row untouched.
    Keep,
}

/// DTO for `POST /api/user`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertUserRequest {
    #[validate(
        required(message = "Email is required"),
        length(max = 254, message = "Email must be at most 254 characters."),
        custom(function = validate_email_format)
    )]
    pub email: Option<String>,

    #[validate(
        length(min = 1, max = 100, message = "Name length must be between 1 and 100 characters."),
        custom(function = validate_display_name)
    )]
    pub name: Option<String>,
}

impl UpsertUserRequest {
    /// Trims both fields and treats an empty name as absent.
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.map(|e| e.trim().to_string()),
            name: self
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        }
    }
}
