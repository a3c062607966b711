// src/state.rs

use std::sync::Arc;

use crate::{
    auth::{self, Authenticator, TokenVerifier},
    config::Config,
    store::QuizStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuizStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Submission authenticator, fixed by `config.environment` at construction.
    pub authenticator: Arc<dyn Authenticator>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn QuizStore>, verifier: Arc<dyn TokenVerifier>, config: Config) -> Self {
        let authenticator = auth::for_environment(config.environment, Arc::clone(&verifier));
        Self {
            store,
            verifier,
            authenticator,
            config,
        }
    }
}
