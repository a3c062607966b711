// src/config.rs

use std::{env, fmt, net::SocketAddr, path::PathBuf};

use dotenvy::dotenv;

/// Passing threshold (percentage) shown on the completion summary.
pub const PASSING_SCORE_PERCENTAGE: u32 = 70;

/// Sentinel domain value meaning "every domain".
pub const ALL_DOMAINS: &str = "all";

/// Deployment mode. Selects the submission authenticator at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Which persistence backend the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub question_seed: Option<PathBuf>,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub rust_log: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {key}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let environment = match env::var("APP_ENV") {
            Err(_) => Environment::Production,
            Ok(value) => parse_environment(&value)?,
        };

        let store_backend = match env::var("STORE_BACKEND") {
            Err(_) => StoreBackend::Postgres,
            Ok(value) => parse_backend(&value)?,
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let question_seed = env::var("QUESTION_SEED").ok().map(PathBuf::from);

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let bind_addr = match env::var("BIND_ADDR") {
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 3000)),
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "BIND_ADDR", value })?,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            store_backend,
            database_url,
            question_seed,
            jwt_secret,
            bind_addr,
            rust_log,
        })
    }
}

fn parse_environment(value: &str) -> Result<Environment, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "production" | "prod" => Ok(Environment::Production),
        "development" | "dev" => Ok(Environment::Development),
        _ => Err(ConfigError::Invalid {
            key: "APP_ENV",
            value: value.to_string(),
        }),
    }
}

fn parse_backend(value: &str) -> Result<StoreBackend, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "postgres" => Ok(StoreBackend::Postgres),
        "memory" => Ok(StoreBackend::Memory),
        _ => Err(ConfigError::Invalid {
            key: "STORE_BACKEND",
            value: value.to_string(),
        }),
    }
}
