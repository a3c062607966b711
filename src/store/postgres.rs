// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::{QuizStore, StoreTransaction, check_question_refs};
use crate::{
    error::AppError,
    models::{
        attempt::{AnswerRecord, NewAttempt, QuizAttempt},
        question::Question,
        user::{OnConflict, User, UserProfile},
    },
};

/// Postgres error code for unique violation.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres error code for foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn list_questions(&self) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT
                id,
                domain_type,
                question,
                option_a,
                option_b,
                option_c,
                option_d,
                correct_answer,
                explanation
            FROM questions
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTransaction { tx }))
    }
}

pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn upsert_user(
        &mut self,
        id: &str,
        profile: &UserProfile,
        on_conflict: OnConflict,
    ) -> Result<User, AppError> {
        // The no-op update in the `Keep` branch makes RETURNING yield the existing row.
        let sql = match on_conflict {
            OnConflict::Update => {
                r#"
                INSERT INTO users (id, email, name)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE SET
                    email = EXCLUDED.email,
                    name = EXCLUDED.name
                RETURNING id, email, name, created_at
                "#
            }
            OnConflict::Keep => {
                r#"
                INSERT INTO users (id, email, name)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE SET id = users.id
                RETURNING id, email, name, created_at
                "#
            }
        };

        sqlx::query_as::<_, User>(sql)
            .bind(id)
            .bind(&profile.email)
            .bind(&profile.name)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                    AppError::Conflict(format!("Email '{}' is already in use", profile.email))
                }
                _ => AppError::from(e),
            })
    }

    async fn create_attempt(&mut self, attempt: &NewAttempt) -> Result<QuizAttempt, AppError> {
        let row = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (user_id, domain_type, score, total_questions, correct_answers)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, domain_type, score, total_questions, correct_answers, completed_at
            "#,
        )
        .bind(&attempt.user_id)
        .bind(&attempt.domain_type)
        .bind(attempt.score)
        .bind(attempt.total_questions)
        .bind(attempt.correct_answers)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn create_answers(
        &mut self,
        attempt_id: i64,
        answers: &[AnswerRecord],
    ) -> Result<u64, AppError> {
        if answers.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i64> = answers.iter().map(|a| a.question_id).collect();
        let known: Vec<i64> = sqlx::query_scalar("SELECT id FROM questions WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.tx)
            .await?;
        check_question_refs(answers, |id| known.contains(&id))?;

        // Use QueryBuilder for a single multi-row INSERT
        let mut query_builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO user_answers (attempt_id, question_id, selected_answer, is_correct) ",
        );
        query_builder.push_values(answers, |mut row, answer| {
            row.push_bind(attempt_id)
                .push_bind(answer.question_id)
                .push_bind(&answer.selected_answer)
                .push_bind(answer.is_correct);
        });

        // A question deleted since the check above still surfaces as a client error.
        let result = query_builder
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                    AppError::BadRequest(
                        "Validation failed: answers reference an unknown question".to_string(),
                    )
                }
                _ => AppError::from(e),
            })?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
