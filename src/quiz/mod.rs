// src/quiz/mod.rs

//! Client-side quiz session: loading a working order, the session reducer,
//! and the HTTP client that talks to the server.

pub mod client;
mod error;
pub mod loader;
pub mod reducer;
pub mod runner;

pub use client::HttpQuizClient;
pub use error::Error;
pub use loader::{
    DomainFilter, LoadTicket, MountGuard, QuestionSetLoader, QuestionSource, StoreQuestionSource,
};
pub use reducer::{QuizAction, QuizState, reduce};
pub use runner::{QuizRunner, QuizSummary};
