// src/services/submission.rs

use crate::{
    auth::{Authenticator, Subject},
    error::AppError,
    models::{
        attempt::{SubmitOutcome, SubmitQuizRequest, ValidatedSubmission},
        user::{OnConflict, UserProfile},
    },
    store::{QuizStore, StoreTransaction},
};

/// Authenticates, validates and records one quiz result.
pub struct SubmissionPipeline<'a> {
    store: &'a dyn QuizStore,
    authenticator: &'a dyn Authenticator,
}

impl<'a> SubmissionPipeline<'a> {
    pub fn new(store: &'a dyn QuizStore, authenticator: &'a dyn Authenticator) -> Self {
        Self {
            store,
            authenticator,
        }
    }

    /// Runs the whole pipeline for a raw request body.
    ///
    /// Either exactly one attempt plus one answer row per entry is committed,
    /// or nothing is.
    pub async fn submit(
        &self,
        credential: Option<&str>,
        body: &[u8],
    ) -> Result<SubmitOutcome, AppError> {
        let subject = self.authenticator.authenticate(credential).await?;

        let request: SubmitQuizRequest = serde_json::from_slice(body)
            .map_err(|_| AppError::BadRequest("Invalid JSON in request body".to_string()))?;
        let submission = request.validate()?;

        self.persist(&subject, submission).await
    }

    /// Writes user, attempt and answers in one transaction.
    pub async fn persist(
        &self,
        subject: &Subject,
        submission: ValidatedSubmission,
    ) -> Result<SubmitOutcome, AppError> {
        let mut tx = self.store.begin().await?;

        match record(tx.as_mut(), subject, submission).await {
            Ok(outcome) => {
                tx.commit().await?;
                tracing::info!(
                    "Saved attempt {} for {} ({} answers)",
                    outcome.attempt_id,
                    subject.id,
                    outcome.answers_created
                );
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

async fn record(
    tx: &mut dyn StoreTransaction,
    subject: &Subject,
    submission: ValidatedSubmission,
) -> Result<SubmitOutcome, AppError> {
    // Only the subject id is guaranteed here, so a missing user row gets placeholders.
    let mut profile = UserProfile::placeholder(&subject.id);
    if subject.anonymous {
        profile.name = Some("Development User".to_string());
    }
    tx.upsert_user(&subject.id, &profile, OnConflict::Keep).await?;

    let (new_attempt, answers) = submission.into_new_attempt(&subject.id);
    let attempt = tx.create_attempt(&new_attempt).await?;
    let answers_created = tx.create_answers(attempt.id, &answers).await?;

    Ok(SubmitOutcome {
        attempt_id: attempt.id,
        answers_created,
    })
}
