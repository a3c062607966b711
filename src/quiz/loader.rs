// src/quiz/loader.rs

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use rand::seq::SliceRandom;

use super::Error;
use crate::{config::ALL_DOMAINS, models::question::Question, store::QuizStore};

/// Which part of the bank a session draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainFilter {
    All,
    Only(String),
}

impl DomainFilter {
    /// `None`, blank and the `"all"` sentinel select every domain.
    pub fn parse(domain: Option<&str>) -> Self {
        match domain.map(str::trim) {
            None | Some("") => DomainFilter::All,
            Some(d) if d == ALL_DOMAINS => DomainFilter::All,
            Some(d) => DomainFilter::Only(d.to_string()),
        }
    }

    pub fn matches(&self, question: &Question) -> bool {
        match self {
            DomainFilter::All => true,
            DomainFilter::Only(domain) => question.domain_type == *domain,
        }
    }

    /// Value sent as `domainType` on submission.
    pub fn as_str(&self) -> &str {
        match self {
            DomainFilter::All => ALL_DOMAINS,
            DomainFilter::Only(domain) => domain,
        }
    }

    /// Title shown for the session.
    pub fn label(&self) -> &str {
        match self {
            DomainFilter::All => "Mixed Quiz",
            DomainFilter::Only(domain) => domain,
        }
    }
}

/// Where the loader gets the question bank from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Whole bank in store order. `credential` is attached when present and
    /// must never be required.
    async fn fetch_questions(&self, credential: Option<&str>) -> Result<Vec<Question>, Error>;
}

/// Reads the bank straight from a store, for in-process callers.
#[derive(Clone)]
pub struct StoreQuestionSource {
    store: Arc<dyn QuizStore>,
}

impl StoreQuestionSource {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QuestionSource for StoreQuestionSource {
    async fn fetch_questions(&self, _credential: Option<&str>) -> Result<Vec<Question>, Error> {
        self.store
            .list_questions()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))
    }
}

/// Discards loads that finish after their session went away.
///
/// Every [`MountGuard::ticket`] call supersedes earlier tickets, and
/// [`MountGuard::unmount`] invalidates all of them.
#[derive(Debug, Clone, Default)]
pub struct MountGuard {
    epoch: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct LoadTicket {
    epoch: Arc<AtomicU64>,
    issued: u64,
}

impl MountGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> LoadTicket {
        let issued = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket {
            epoch: Arc::clone(&self.epoch),
            issued,
        }
    }

    pub fn unmount(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

impl LoadTicket {
    pub fn is_live(&self) -> bool {
        self.epoch.load(Ordering::SeqCst) == self.issued
    }
}

/// Turns a bank into a session's working order.
pub struct QuestionSetLoader<S> {
    source: S,
}

impl<S: QuestionSource> QuestionSetLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn load(
        &self,
        domain: &DomainFilter,
        credential: Option<&str>,
    ) -> Result<Vec<Question>, Error> {
        let bank = self.source.fetch_questions(credential).await?;
        working_order(bank, domain)
    }

    /// Like [`load`](Self::load), but yields `None` when `ticket` went stale
    /// while the fetch was in flight.
    pub async fn load_guarded(
        &self,
        ticket: &LoadTicket,
        domain: &DomainFilter,
        credential: Option<&str>,
    ) -> Option<Result<Vec<Question>, Error>> {
        let result = self.load(domain, credential).await;
        if ticket.is_live() {
            Some(result)
        } else {
            tracing::debug!("Discarding question load for an unmounted session");
            None
        }
    }
}

/// Filters by domain (keeping store order), rejects an empty result, then
/// shuffles.
pub fn working_order(bank: Vec<Question>, domain: &DomainFilter) -> Result<Vec<Question>, Error> {
    let mut questions: Vec<Question> = bank.into_iter().filter(|q| domain.matches(q)).collect();
    if questions.is_empty() {
        return Err(Error::EmptyResult(domain.as_str().to_string()));
    }
    questions.shuffle(&mut rand::rng());
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn question(id: i64, domain: &str) -> Question {
        Question {
            id,
            domain_type: domain.to_string(),
            question: format!("Question {id}"),
            option_a: "a".into(),
            option_b: "b".into(),
            option_c: "c".into(),
            option_d: "d".into(),
            correct_answer: "A".into(),
            explanation: "because".into(),
        }
    }

    fn bank() -> Vec<Question> {
        let mut bank = Vec::new();
        for id in 1..=32 {
            let domain = match id % 4 {
                0 => "Domain 1",
                1 => "Domain 2",
                2 => "Domain 3",
                _ => "Domain 4",
            };
            bank.push(question(id, domain));
        }
        bank
    }

    struct StubSource {
        bank: Vec<Question>,
        seen_credential: Mutex<Option<String>>,
        unmount_on_fetch: Option<MountGuard>,
    }

    impl StubSource {
        fn new(bank: Vec<Question>) -> Self {
            Self {
                bank,
                seen_credential: Mutex::new(None),
                unmount_on_fetch: None,
            }
        }
    }

    #[async_trait]
    impl QuestionSource for StubSource {
        async fn fetch_questions(&self, credential: Option<&str>) -> Result<Vec<Question>, Error> {
            *self.seen_credential.lock().unwrap() = credential.map(str::to_string);
            if let Some(guard) = &self.unmount_on_fetch {
                guard.unmount();
            }
            Ok(self.bank.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl QuestionSource for FailingSource {
        async fn fetch_questions(&self, _: Option<&str>) -> Result<Vec<Question>, Error> {
            Err(Error::Fetch("store offline".into()))
        }
    }

    fn sorted_ids(questions: &[Question]) -> Vec<i64> {
        let mut ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        ids.sort();
        ids
    }

    #[test]
    fn filter_parsing() {
        assert_eq!(DomainFilter::parse(None), DomainFilter::All);
        assert_eq!(DomainFilter::parse(Some("all")), DomainFilter::All);
        assert_eq!(DomainFilter::parse(Some("  ")), DomainFilter::All);
        assert_eq!(
            DomainFilter::parse(Some("Domain 2")),
            DomainFilter::Only("Domain 2".into())
        );
        assert_eq!(DomainFilter::All.label(), "Mixed Quiz");
        assert_eq!(DomainFilter::All.as_str(), "all");
    }

    #[tokio::test]
    async fn domain_filter_keeps_only_matching_questions() {
        let loader = QuestionSetLoader::new(StubSource::new(bank()));
        let questions = loader
            .load(&DomainFilter::Only("Domain 1".into()), None)
            .await
            .unwrap();
        assert_eq!(questions.len(), 8);
        assert!(questions.iter().all(|q| q.domain_type == "Domain 1"));
    }

    #[tokio::test]
    async fn all_returns_a_permutation_of_the_bank() {
        let loader = QuestionSetLoader::new(StubSource::new(bank()));
        let questions = loader.load(&DomainFilter::All, None).await.unwrap();
        assert_eq!(sorted_ids(&questions), (1..=32).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn unknown_domain_is_an_empty_result_error() {
        let loader = QuestionSetLoader::new(StubSource::new(bank()));
        let err = loader
            .load(&DomainFilter::Only("Domain 9".into()), None)
            .await
            .unwrap_err();
        assert_eq!(err, Error::EmptyResult("Domain 9".into()));
    }

    #[tokio::test]
    async fn empty_bank_is_an_empty_result_error() {
        let loader = QuestionSetLoader::new(StubSource::new(Vec::new()));
        let err = loader.load(&DomainFilter::All, None).await.unwrap_err();
        assert!(matches!(err, Error::EmptyResult(_)));
    }

    #[tokio::test]
    async fn credential_is_forwarded_when_present() {
        let source = StubSource::new(bank());
        let loader = QuestionSetLoader::new(source);
        loader.load(&DomainFilter::All, Some("tok")).await.unwrap();
        assert_eq!(
            loader.source.seen_credential.lock().unwrap().as_deref(),
            Some("tok")
        );
        loader.load(&DomainFilter::All, None).await.unwrap();
        assert_eq!(*loader.source.seen_credential.lock().unwrap(), None);
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let loader = QuestionSetLoader::new(FailingSource);
        let err = loader.load(&DomainFilter::All, None).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[tokio::test]
    async fn live_ticket_delivers_result() {
        let guard = MountGuard::new();
        let loader = QuestionSetLoader::new(StubSource::new(bank()));
        let ticket = guard.ticket();
        let result = loader
            .load_guarded(&ticket, &DomainFilter::All, None)
            .await
            .expect("ticket still live");
        assert_eq!(result.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn unmount_during_fetch_discards_result() {
        let guard = MountGuard::new();
        let mut source = StubSource::new(bank());
        source.unmount_on_fetch = Some(guard.clone());
        let loader = QuestionSetLoader::new(source);

        let ticket = guard.ticket();
        let result = loader.load_guarded(&ticket, &DomainFilter::All, None).await;
        assert!(result.is_none());
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let guard = MountGuard::new();
        let first = guard.ticket();
        let second = guard.ticket();
        assert!(!first.is_live());
        assert!(second.is_live());
        guard.unmount();
        assert!(!second.is_live());
    }

    #[test]
    fn working_order_preserves_membership() {
        let questions = working_order(bank(), &DomainFilter::Only("Domain 3".into())).unwrap();
        assert_eq!(sorted_ids(&questions), vec![2, 6, 10, 14, 18, 22, 26, 30]);
    }
}
