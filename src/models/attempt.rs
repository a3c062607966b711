// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::AppError;

/// One answered question inside a quiz session.
/// Also the shape of each entry of a submission's `answers` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: i64,
    pub selected_answer: String,
    pub is_correct: bool,
}

/// Represents the 'quiz_attempts' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: String,
    pub domain_type: String,
    /// Percentage, 0-100.
    pub score: f64,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'user_answers' table in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_answer: String,
    pub is_correct: bool,
}

/// Fields needed to insert a quiz attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttempt {
    pub user_id: String,
    pub domain_type: String,
    pub score: f64,
    pub total_questions: i32,
    pub correct_answers: i32,
}

/// Payload a client sends to `POST /api/quiz/submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub domain_type: String,
    pub score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub answers: Vec<AnswerRecord>,
}

/// Raw submission body as received by the server.
///
/// Every field is kept as an untyped JSON value so that validation can report
/// all problems at once instead of failing on the first type mismatch.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    #[serde(default)]
    pub domain_type: Value,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub total_questions: Value,
    #[serde(default)]
    pub correct_answers: Value,
    #[serde(default)]
    pub answers: Value,
}

/// A submission that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub domain_type: String,
    pub score: f64,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub answers: Vec<AnswerRecord>,
}

impl ValidatedSubmission {
    pub fn into_new_attempt(self, user_id: &str) -> (NewAttempt, Vec<AnswerRecord>) {
        let attempt = NewAttempt {
            user_id: user_id.to_string(),
            domain_type: self.domain_type,
            score: self.score,
            total_questions: self.total_questions,
            correct_answers: self.correct_answers,
        };
        (attempt, self.answers)
    }
}

/// Result of a committed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub attempt_id: i64,
    pub answers_created: u64,
}

impl SubmitQuizRequest {
    /// Checks the payload and returns the typed submission, or a `BadRequest`
    /// listing every problem found.
    pub fn validate(self) -> Result<ValidatedSubmission, AppError> {
        let mut problems: Vec<String> = Vec::new();

        let domain_type = match self.domain_type {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Null => {
                problems.push("domainType is required".into());
                None
            }
            _ => {
                problems.push("domainType must be a non-empty string".into());
                None
            }
        };

        let score = match &self.score {
            Value::Null => {
                problems.push("score is required".into());
                None
            }
            Value::Number(n) => match n.as_f64() {
                Some(s) if (0.0..=100.0).contains(&s) => Some(s),
                _ => {
                    problems.push("score must be a number between 0 and 100".into());
                    None
                }
            },
            _ => {
                problems.push("score must be a number between 0 and 100".into());
                None
            }
        };

        let total_questions = match &self.total_questions {
            Value::Null => {
                problems.push("totalQuestions is required".into());
                None
            }
            value => match count_value(value) {
                Some(n) if n > 0 => Some(n),
                _ => {
                    problems.push("totalQuestions must be a positive integer".into());
                    None
                }
            },
        };

        let correct_answers = match &self.correct_answers {
            Value::Null => {
                problems.push("correctAnswers is required".into());
                None
            }
            value => match count_value(value) {
                Some(n) => Some(n),
                None => {
                    problems.push("correctAnswers must be a non-negative integer".into());
                    None
                }
            },
        };

        let answers = match self.answers {
            Value::Array(entries) if !entries.is_empty() => {
                let mut records = Vec::with_capacity(entries.len());
                for (i, entry) in entries.iter().enumerate() {
                    match answer_record(entry) {
                        Ok(record) => records.push(record),
                        Err(reasons) => problems.extend(
                            reasons.into_iter().map(|r| format!("answers[{i}].{r}")),
                        ),
                    }
                }
                Some(records)
            }
            _ => {
                problems.push("answers must be a non-empty array".into());
                None
            }
        };

        match (domain_type, score, total_questions, correct_answers, answers) {
            (Some(domain_type), Some(score), Some(total_questions), Some(correct_answers), Some(answers))
                if problems.is_empty() =>
            {
                Ok(ValidatedSubmission {
                    domain_type,
                    score,
                    total_questions,
                    correct_answers,
                    answers,
                })
            }
            _ => Err(AppError::BadRequest(format!(
                "Validation failed: {}",
                problems.join("; ")
            ))),
        }
    }
}

/// Non-negative integer that fits the database column.
fn count_value(value: &Value) -> Option<i32> {
    value.as_u64().and_then(|n| i32::try_from(n).ok())
}

fn answer_record(entry: &Value) -> Result<AnswerRecord, Vec<&'static str>> {
    let Some(obj) = entry.as_object() else {
        return Err(vec!["entry must be an object"]);
    };

    let mut reasons = Vec::new();

    let question_id = obj
        .get("questionId")
        .and_then(Value::as_i64)
        .filter(|id| *id > 0);
    if question_id.is_none() {
        reasons.push("questionId must be a positive integer");
    }

    let selected_answer = obj
        .get("selectedAnswer")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if selected_answer.is_none() {
        reasons.push("selectedAnswer must be a non-empty string");
    }

    let is_correct = obj.get("isCorrect").and_then(Value::as_bool);
    if is_correct.is_none() {
        reasons.push("isCorrect must be a boolean");
    }

    match (question_id, selected_answer, is_correct) {
        (Some(question_id), Some(selected_answer), Some(is_correct)) => Ok(AnswerRecord {
            question_id,
            selected_answer: selected_answer.to_string(),
            is_correct,
        }),
        _ => Err(reasons),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<ValidatedSubmission, AppError> {
        serde_json::from_value::<SubmitQuizRequest>(value)
            .unwrap()
            .validate()
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::BadRequest(msg) => msg,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn accepts_well_formed_payload() {
        let submission = parse(json!({
            "domainType": "Domain 1",
            "score": 50,
            "totalQuestions": 2,
            "correctAnswers": 1,
            "answers": [
                { "questionId": 1, "selectedAnswer": "A", "isCorrect": true },
                { "questionId": 2, "selectedAnswer": "B", "isCorrect": false }
            ]
        }))
        .unwrap();

        assert_eq!(submission.domain_type, "Domain 1");
        assert_eq!(submission.score, 50.0);
        assert_eq!(submission.answers.len(), 2);
        assert!(!submission.answers[1].is_correct);
    }

    #[test]
    fn rejects_score_above_range() {
        let msg = message(
            parse(json!({
                "domainType": "Domain 1",
                "score": 101,
                "totalQuestions": 1,
                "correctAnswers": 1,
                "answers": [{ "questionId": 1, "selectedAnswer": "A", "isCorrect": true }]
            }))
            .unwrap_err(),
        );
        assert!(msg.contains("score must be a number between 0 and 100"));
    }

    #[test]
    fn fractional_score_in_range_is_accepted() {
        let submission = parse(json!({
            "domainType": "all",
            "score": 66.7,
            "totalQuestions": 3,
            "correctAnswers": 2,
            "answers": [{ "questionId": 1, "selectedAnswer": "A", "isCorrect": true }]
        }))
        .unwrap();
        assert_eq!(submission.score, 66.7);
    }

    #[test]
    fn itemizes_every_problem() {
        let msg = message(
            parse(json!({
                "domainType": "",
                "score": "high",
                "totalQuestions": 0,
                "answers": []
            }))
            .unwrap_err(),
        );
        assert!(msg.contains("domainType must be a non-empty string"));
        assert!(msg.contains("score must be a number"));
        assert!(msg.contains("totalQuestions must be a positive integer"));
        assert!(msg.contains("correctAnswers is required"));
        assert!(msg.contains("answers must be a non-empty array"));
    }

    #[test]
    fn reports_bad_answer_entries_by_index() {
        let msg = message(
            parse(json!({
                "domainType": "Domain 2",
                "score": 0,
                "totalQuestions": 2,
                "correctAnswers": 0,
                "answers": [
                    { "questionId": 3, "selectedAnswer": "A", "isCorrect": false },
                    { "questionId": 0, "selectedAnswer": "", "isCorrect": "no" }
                ]
            }))
            .unwrap_err(),
        );
        assert!(msg.contains("answers[1].questionId"));
        assert!(msg.contains("answers[1].selectedAnswer"));
        assert!(msg.contains("answers[1].isCorrect"));
        assert!(!msg.contains("answers[0]"));
    }

    #[test]
    fn zero_correct_answers_is_present() {
        let submission = parse(json!({
            "domainType": "Domain 3",
            "score": 0,
            "totalQuestions": 1,
            "correctAnswers": 0,
            "answers": [{ "questionId": 9, "selectedAnswer": "D", "isCorrect": false }]
        }))
        .unwrap();
        assert_eq!(submission.correct_answers, 0);
    }

    #[test]
    fn client_payload_round_trips_through_validation() {
        let payload = QuizSubmission {
            domain_type: "Domain 4".into(),
            score: 100,
            total_questions: 1,
            correct_answers: 1,
            answers: vec![AnswerRecord {
                question_id: 12,
                selected_answer: "B".into(),
                is_correct: true,
            }],
        };
        let submission = parse(serde_json::to_value(&payload).unwrap()).unwrap();
        assert_eq!(submission.total_questions, 1);
        assert_eq!(submission.answers, payload.answers);
    }
}
