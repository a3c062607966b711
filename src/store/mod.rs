// src/store/mod.rs

//! Persistence boundary.
//!
//! A [`QuizStore`] reads the question bank and opens transactions. Writes only
//! go through a [`StoreTransaction`], and nothing written through it is
//! visible until [`StoreTransaction::commit`]. Dropping a transaction without
//! committing discards its writes.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerRecord, NewAttempt, QuizAttempt},
        question::Question,
        user::{OnConflict, User, UserProfile},
    },
};

pub use memory::MemoryQuizStore;
pub use postgres::PgQuizStore;

#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Full question bank, ascending by id.
    async fn list_questions(&self) -> Result<Vec<Question>, AppError>;

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, AppError>;
}

#[async_trait]
pub trait StoreTransaction: Send {
    async fn upsert_user(
        &mut self,
        id: &str,
        profile: &UserProfile,
        on_conflict: OnConflict,
    ) -> Result<User, AppError>;

    async fn create_attempt(&mut self, attempt: &NewAttempt) -> Result<QuizAttempt, AppError>;

    /// Inserts every answer for `attempt_id`, returning the number of rows.
    async fn create_answers(
        &mut self,
        attempt_id: i64,
        answers: &[AnswerRecord],
    ) -> Result<u64, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}

/// Fails with an itemized `BadRequest` when an answer points at a question
/// that is not in the bank.
pub(crate) fn check_question_refs(
    answers: &[AnswerRecord],
    known: impl Fn(i64) -> bool,
) -> Result<(), AppError> {
    let problems: Vec<String> = answers
        .iter()
        .enumerate()
        .filter(|(_, answer)| !known(answer.question_id))
        .map(|(i, answer)| {
            format!(
                "answers[{i}].questionId {} does not match any question",
                answer.question_id
            )
        })
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Validation failed: {}",
            problems.join("; ")
        )))
    }
}

/// Runs `upsert_user` in a transaction of its own.
pub async fn upsert_user(
    store: &dyn QuizStore,
    id: &str,
    profile: &UserProfile,
    on_conflict: OnConflict,
) -> Result<User, AppError> {
    let mut tx = store.begin().await?;
    match tx.upsert_user(id, profile, on_conflict).await {
        Ok(user) => {
            tx.commit().await?;
            Ok(user)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("Rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}
