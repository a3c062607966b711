// src/quiz/client.rs

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use url::Url;

use super::{Error, loader::QuestionSource};
use crate::models::{
    attempt::{QuizSubmission, SubmitOutcome},
    question::Question,
};

/// `{ success, data?, error? }` envelope returned by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

/// HTTP client for the quiz API.
#[derive(Debug, Clone)]
pub struct HttpQuizClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpQuizClient {
    /// `base` is the server origin, e.g. `http://localhost:3000/`.
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base
            .join(path)
            .map_err(|e| Error::Fetch(format!("bad endpoint {path}: {e}")))
    }

    /// Posts a finished session's result.
    pub async fn submit(
        &self,
        credential: Option<&str>,
        submission: &QuizSubmission,
    ) -> Result<SubmitOutcome, Error> {
        let request = with_bearer(
            self.http.post(self.endpoint("api/quiz/submit")?),
            credential,
        )
        .json(submission);

        let response = request.send().await?;
        let status = response.status();
        let envelope: Envelope<SubmitOutcome> = response.json().await?;
        unwrap_envelope(status, envelope)
    }
}

fn with_bearer(request: RequestBuilder, credential: Option<&str>) -> RequestBuilder {
    match credential {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

fn unwrap_envelope<T>(status: StatusCode, envelope: Envelope<T>) -> Result<T, Error> {
    match envelope {
        Envelope {
            success: true,
            data: Some(data),
            ..
        } if status.is_success() => Ok(data),
        Envelope { error, .. } => Err(Error::Rejected {
            status: status.as_u16(),
            message: error.unwrap_or_else(|| "Unexpected response".to_string()),
        }),
    }
}

#[async_trait]
impl QuestionSource for HttpQuizClient {
    async fn fetch_questions(&self, credential: Option<&str>) -> Result<Vec<Question>, Error> {
        let request = with_bearer(self.http.get(self.endpoint("api/questions")?), credential);

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("server responded with {status}")));
        }
        let envelope: Envelope<Vec<Question>> = response.json().await?;
        unwrap_envelope(status, envelope).map_err(|e| Error::Fetch(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_onto_base() {
        let client = HttpQuizClient::new(Url::parse("http://localhost:3000/").unwrap());
        assert_eq!(
            client.endpoint("api/questions").unwrap().as_str(),
            "http://localhost:3000/api/questions"
        );
    }

    #[test]
    fn failed_envelope_becomes_rejection() {
        let envelope: Envelope<SubmitOutcome> =
            serde_json::from_str(r#"{"success":false,"error":"Score must be a number"}"#).unwrap();
        let err = unwrap_envelope(StatusCode::BAD_REQUEST, envelope).unwrap_err();
        assert_eq!(
            err,
            Error::Rejected {
                status: 400,
                message: "Score must be a number".into()
            }
        );
    }

    #[test]
    fn successful_envelope_yields_data() {
        let envelope: Envelope<SubmitOutcome> = serde_json::from_str(
            r#"{"success":true,"data":{"attemptId":4,"answersCreated":8},"message":"ok"}"#,
        )
        .unwrap();
        let outcome = unwrap_envelope(StatusCode::OK, envelope).unwrap();
        assert_eq!(outcome.attempt_id, 4);
        assert_eq!(outcome.answers_created, 8);
    }
}
