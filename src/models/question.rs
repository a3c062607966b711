// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    /// Domain classification tag (e.g. "Domain 1").
    pub domain_type: String,

    /// The question text.
    pub question: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// Label of the correct option: "A", "B", "C" or "D".
    pub correct_answer: String,

    pub explanation: String,
}

impl Question {
    pub fn is_correct(&self, label: &str) -> bool {
        self.correct_answer == label
    }
}

/// One entry of `GET /api/domains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSummary {
    pub id: String,
    pub question_count: usize,
}

/// Groups questions by domain tag, ordered by tag.
pub fn summarize_domains(questions: &[Question]) -> Vec<DomainSummary> {
    let mut counts = std::collections::BTreeMap::<&str, usize>::new();
    for q in questions {
        *counts.entry(q.domain_type.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(id, question_count)| DomainSummary {
            id: id.to_string(),
            question_count,
        })
        .collect()
}
