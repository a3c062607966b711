// src/store/memory.rs

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{QuizStore, StoreTransaction, check_question_refs};
use crate::{
    error::AppError,
    models::{
        attempt::{AnswerRecord, NewAttempt, QuizAttempt, UserAnswer},
        question::Question,
        user::{OnConflict, User, UserProfile},
    },
};

#[derive(Debug, Default)]
struct Tables {
    questions: Vec<Question>,
    users: Vec<User>,
    attempts: Vec<QuizAttempt>,
    answers: Vec<UserAnswer>,
}

/// Process-local store for development runs and tests.
///
/// Transactions stage their writes and apply them in one step on commit.
/// Ids come from sequences that, as in Postgres, are not rolled back.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuizStore {
    tables: Arc<Mutex<Tables>>,
    attempt_seq: Arc<AtomicI64>,
    answer_seq: Arc<AtomicI64>,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store holding `questions`, kept sorted by id.
    pub fn with_questions(mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(|q| q.id);
        Self {
            tables: Arc::new(Mutex::new(Tables {
                questions,
                ..Tables::default()
            })),
            ..Self::default()
        }
    }

    pub async fn attempts(&self) -> Vec<QuizAttempt> {
        self.tables.lock().await.attempts.clone()
    }

    pub async fn answers(&self) -> Vec<UserAnswer> {
        self.tables.lock().await.answers.clone()
    }

    pub async fn user(&self, id: &str) -> Option<User> {
        self.tables
            .lock()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn list_questions(&self) -> Result<Vec<Question>, AppError> {
        Ok(self.tables.lock().await.questions.clone())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, AppError> {
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            users: Vec::new(),
            attempts: Vec::new(),
            answers: Vec::new(),
        }))
    }
}

struct MemoryTransaction {
    store: MemoryQuizStore,
    users: Vec<(User, OnConflict)>,
    attempts: Vec<QuizAttempt>,
    answers: Vec<UserAnswer>,
}

fn apply_user(users: &mut Vec<User>, user: &User, on_conflict: OnConflict) -> Result<User, AppError> {
    // `Keep` on an existing row writes nothing, so it cannot clash on email.
    if on_conflict == OnConflict::Keep {
        if let Some(existing) = users.iter().find(|u| u.id == user.id) {
            return Ok(existing.clone());
        }
    }

    if users
        .iter()
        .any(|u| u.id != user.id && u.email == user.email)
    {
        return Err(AppError::Conflict(format!(
            "Email '{}' is already in use",
            user.email
        )));
    }

    match users.iter_mut().find(|u| u.id == user.id) {
        Some(existing) => {
            if on_conflict == OnConflict::Update {
                existing.email = user.email.clone();
                existing.name = user.name.clone();
            }
            Ok(existing.clone())
        }
        None => {
            users.push(user.clone());
            Ok(user.clone())
        }
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn upsert_user(
        &mut self,
        id: &str,
        profile: &UserProfile,
        on_conflict: OnConflict,
    ) -> Result<User, AppError> {
        let candidate = User {
            id: id.to_string(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            created_at: Utc::now(),
        };

        // Resolve against committed rows plus this transaction's own writes.
        let mut view = self.store.tables.lock().await.users.clone();
        for (staged, mode) in &self.users {
            apply_user(&mut view, staged, *mode)?;
        }
        let user = apply_user(&mut view, &candidate, on_conflict)?;

        self.users.push((candidate, on_conflict));
        Ok(user)
    }

    async fn create_attempt(&mut self, attempt: &NewAttempt) -> Result<QuizAttempt, AppError> {
        let known_user = self.users.iter().any(|(u, _)| u.id == attempt.user_id)
            || self.store.user(&attempt.user_id).await.is_some();
        if !known_user {
            return Err(AppError::InternalServerError(format!(
                "quiz_attempts.user_id references unknown user {}",
                attempt.user_id
            )));
        }

        let row = QuizAttempt {
            id: self.store.attempt_seq.fetch_add(1, Ordering::SeqCst) + 1,
            user_id: attempt.user_id.clone(),
            domain_type: attempt.domain_type.clone(),
            score: attempt.score,
            total_questions: attempt.total_questions,
            correct_answers: attempt.correct_answers,
            completed_at: Utc::now(),
        };
        self.attempts.push(row.clone());
        Ok(row)
    }

    async fn create_answers(
        &mut self,
        attempt_id: i64,
        answers: &[AnswerRecord],
    ) -> Result<u64, AppError> {
        if !self.attempts.iter().any(|a| a.id == attempt_id) {
            return Err(AppError::InternalServerError(format!(
                "user_answers.attempt_id references unknown attempt {attempt_id}"
            )));
        }

        {
            let tables = self.store.tables.lock().await;
            check_question_refs(answers, |id| tables.questions.iter().any(|q| q.id == id))?;
        }

        for answer in answers {
            self.answers.push(UserAnswer {
                id: self.store.answer_seq.fetch_add(1, Ordering::SeqCst) + 1,
                attempt_id,
                question_id: answer.question_id,
                selected_answer: answer.selected_answer.clone(),
                is_correct: answer.is_correct,
            });
        }
        Ok(answers.len() as u64)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryTransaction {
            store,
            users,
            attempts,
            answers,
        } = *self;

        let mut tables = store.tables.lock().await;

        // Re-check users against the latest committed state before touching anything.
        let mut merged = tables.users.clone();
        for (user, mode) in &users {
            apply_user(&mut merged, user, *mode)?;
        }

        tables.users = merged;
        tables.attempts.extend(attempts);
        tables.answers.extend(answers);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::upsert_user;

    fn question(id: i64) -> Question {
        Question {
            id,
            domain_type: "Domain 1".into(),
            question: format!("Q{id}"),
            option_a: "a".into(),
            option_b: "b".into(),
            option_c: "c".into(),
            option_d: "d".into(),
            correct_answer: "A".into(),
            explanation: String::new(),
        }
    }

    fn attempt(user_id: &str) -> NewAttempt {
        NewAttempt {
            user_id: user_id.into(),
            domain_type: "Domain 1".into(),
            score: 100.0,
            total_questions: 1,
            correct_answers: 1,
        }
    }

    fn answer(question_id: i64) -> AnswerRecord {
        AnswerRecord {
            question_id,
            selected_answer: "A".into(),
            is_correct: true,
        }
    }

    #[tokio::test]
    async fn questions_come_back_sorted() {
        let store = MemoryQuizStore::with_questions(vec![question(3), question(1), question(2)]);
        let ids: Vec<i64> = store
            .list_questions()
            .await
            .unwrap()
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn writes_are_invisible_until_commit() {
        let store = MemoryQuizStore::with_questions(vec![question(1), question(2)]);
        let mut tx = store.begin().await.unwrap();
        tx.upsert_user("u1", &UserProfile::placeholder("u1"), OnConflict::Keep)
            .await
            .unwrap();
        let created = tx.create_attempt(&attempt("u1")).await.unwrap();
        assert_eq!(tx.create_answers(created.id, &[answer(1), answer(2)]).await.unwrap(), 2);

        assert!(store.attempts().await.is_empty());
        tx.commit().await.unwrap();

        assert_eq!(store.attempts().await.len(), 1);
        assert_eq!(store.answers().await.len(), 2);
        assert!(store.user("u1").await.is_some());
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_nothing() {
        let store = MemoryQuizStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.upsert_user("u1", &UserProfile::placeholder("u1"), OnConflict::Keep)
                .await
                .unwrap();
            tx.create_attempt(&attempt("u1")).await.unwrap();
        }
        assert!(store.attempts().await.is_empty());
        assert!(store.user("u1").await.is_none());
    }

    #[tokio::test]
    async fn attempt_requires_existing_user() {
        let store = MemoryQuizStore::new();
        let mut tx = store.begin().await.unwrap();
        assert!(tx.create_attempt(&attempt("ghost")).await.is_err());
    }

    #[tokio::test]
    async fn keep_does_not_overwrite_profile() {
        let store = MemoryQuizStore::new();
        let profile = UserProfile {
            email: "real@example.org".into(),
            name: Some("Real Name".into()),
        };
        upsert_user(&store, "u1", &profile, OnConflict::Update)
            .await
            .unwrap();
        let kept = upsert_user(
            &store,
            "u1",
            &UserProfile::placeholder("u1"),
            OnConflict::Keep,
        )
        .await
        .unwrap();
        assert_eq!(kept.email, "real@example.org");
        assert_eq!(store.user("u1").await.unwrap().name.as_deref(), Some("Real Name"));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryQuizStore::new();
        let profile = UserProfile {
            email: "shared@example.org".into(),
            name: None,
        };
        upsert_user(&store, "u1", &profile, OnConflict::Update)
            .await
            .unwrap();
        let err = upsert_user(&store, "u2", &profile, OnConflict::Update)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn answers_must_reference_known_questions() {
        let store = MemoryQuizStore::with_questions(vec![question(1)]);
        let mut tx = store.begin().await.unwrap();
        tx.upsert_user("u1", &UserProfile::placeholder("u1"), OnConflict::Keep)
            .await
            .unwrap();
        let created = tx.create_attempt(&attempt("u1")).await.unwrap();

        let err = tx
            .create_answers(created.id, &[answer(1), answer(999_999)])
            .await
            .unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("answers[1].questionId 999999"));
                assert!(!msg.contains("answers[0]"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn keep_on_existing_row_ignores_email_clash() {
        let store = MemoryQuizStore::new();
        // u2 already owns the address u1's placeholder would use.
        upsert_user(
            &store,
            "u2",
            &UserProfile {
                email: "u1@example.com".into(),
                name: None,
            },
            OnConflict::Update,
        )
        .await
        .unwrap();
        upsert_user(
            &store,
            "u1",
            &UserProfile {
                email: "one@example.org".into(),
                name: None,
            },
            OnConflict::Update,
        )
        .await
        .unwrap();

        let kept = upsert_user(
            &store,
            "u1",
            &UserProfile::placeholder("u1"),
            OnConflict::Keep,
        )
        .await
        .unwrap();
        assert_eq!(kept.email, "one@example.org");
    }
}
