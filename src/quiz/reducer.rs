// src/quiz/reducer.rs

use crate::models::attempt::AnswerRecord;

/// State of one quiz session.
///
/// `score` always equals the number of correct entries in `answers`; it is
/// recomputed on every selection rather than incremented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizState {
    pub current_index: usize,
    pub selected_answer: Option<String>,
    pub show_explanation: bool,
    pub score: usize,
    pub answers: Vec<AnswerRecord>,
    pub complete: bool,
}

impl QuizState {
    pub fn initial() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAction {
    Select {
        question_id: i64,
        answer: String,
        correct_answer: String,
    },
    Next {
        total: usize,
    },
    Restart,
}

/// Applies `action` to `state`. Total: every action yields a state.
///
/// A complete session ignores everything except `Restart`.
pub fn reduce(state: QuizState, action: QuizAction) -> QuizState {
    match action {
        QuizAction::Restart => QuizState::initial(),
        _ if state.complete => state,
        QuizAction::Select {
            question_id,
            answer,
            correct_answer,
        } => select(state, question_id, answer, &correct_answer),
        QuizAction::Next { total } => next(state, total),
    }
}

fn select(mut state: QuizState, question_id: i64, answer: String, correct_answer: &str) -> QuizState {
    let record = AnswerRecord {
        question_id,
        is_correct: answer == correct_answer,
        selected_answer: answer.clone(),
    };

    match state.answers.iter_mut().find(|a| a.question_id == question_id) {
        Some(existing) => *existing = record,
        None => state.answers.push(record),
    }

    state.score = state.answers.iter().filter(|a| a.is_correct).count();
    state.selected_answer = Some(answer);
    state.show_explanation = true;
    state
}

fn next(mut state: QuizState, total: usize) -> QuizState {
    if state.current_index + 1 >= total {
        state.complete = true;
    } else {
        state.current_index += 1;
        state.selected_answer = None;
        state.show_explanation = false;
    }
    state
}
