// src/quiz/error.rs

use std::fmt;

/// Failures surfaced to the quiz UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The bank could not be fetched.
    Fetch(String),
    /// The domain filter matched no question. The UI offers a way back to
    /// domain selection.
    EmptyResult(String),
    /// The server answered with a non-success envelope.
    Rejected { status: u16, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Fetch(msg) => write!(f, "Failed to fetch questions: {msg}"),
            Error::EmptyResult(domain) => {
                write!(f, "No questions found for the selected domain ({domain})")
            }
            Error::Rejected { status, message } => write!(f, "Request rejected ({status}): {message}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}
