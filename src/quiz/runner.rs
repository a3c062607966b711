// src/quiz/runner.rs

use serde::Serialize;

use super::{
    loader::DomainFilter,
    reducer::{QuizAction, QuizState, reduce},
};
use crate::{
    config::PASSING_SCORE_PERCENTAGE,
    models::{attempt::QuizSubmission, question::Question},
};

/// Result screen data for a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub percentage: u32,
    pub score: usize,
    pub total: usize,
    pub passed: bool,
    pub domain_label: String,
}

/// Drives one quiz session over a loaded working order.
#[derive(Debug, Clone)]
pub struct QuizRunner {
    domain: DomainFilter,
    questions: Vec<Question>,
    state: QuizState,
}

impl QuizRunner {
    pub fn new(domain: DomainFilter, questions: Vec<Question>) -> Self {
        Self {
            domain,
            questions,
            state: QuizState::initial(),
        }
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn domain(&self) -> &DomainFilter {
        &self.domain
    }

    /// Question currently on screen; `None` once the session is complete.
    pub fn current_question(&self) -> Option<&Question> {
        if self.state.complete {
            return None;
        }
        self.questions.get(self.state.current_index)
    }

    /// Records `answer` for the current question and returns whether it was
    /// correct.
    pub fn select(&mut self, answer: &str) -> Option<bool> {
        let question = self.current_question()?;
        let is_correct = question.is_correct(answer);
        let action = QuizAction::Select {
            question_id: question.id,
            answer: answer.to_string(),
            correct_answer: question.correct_answer.clone(),
        };
        self.dispatch(action);
        Some(is_correct)
    }

    pub fn next(&mut self) {
        let total = self.questions.len();
        self.dispatch(QuizAction::Next { total });
    }

    pub fn restart(&mut self) {
        self.dispatch(QuizAction::Restart);
    }

    fn dispatch(&mut self, action: QuizAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        if !self.state.complete {
            return None;
        }
        let total = self.questions.len();
        let percentage = percentage(self.state.score, total);
        Some(QuizSummary {
            percentage,
            score: self.state.score,
            total,
            passed: percentage >= PASSING_SCORE_PERCENTAGE,
            domain_label: self.domain.label().to_string(),
        })
    }

    /// Payload for `POST /api/quiz/submit`, available once complete.
    pub fn submission(&self) -> Option<QuizSubmission> {
        let summary = self.summary()?;
        Some(QuizSubmission {
            domain_type: self.domain.as_str().to_string(),
            score: summary.percentage,
            total_questions: summary.total as u32,
            correct_answers: summary.score as u32,
            answers: self.state.answers.clone(),
        })
    }
}

/// `round(score / total * 100)`; zero when there are no questions.
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as u32
}
