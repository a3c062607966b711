// src/main.rs

use std::{path::Path, sync::Arc, time::Duration};

use quiz_backend::{
    auth::TokenVerifier,
    config::{Config, StoreBackend},
    models::question::Question,
    routes,
    state::AppState,
    store::{MemoryQuizStore, PgQuizStore, QuizStore},
    utils::jwt::JwtVerifier,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load configuration from environment (.env included)
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    tracing::info!("Starting in {:?} mode", config.environment);

    let store: Arc<dyn QuizStore> = match config.store_backend {
        StoreBackend::Postgres => Arc::new(PgQuizStore::new(connect_postgres(&config).await?)),
        StoreBackend::Memory => {
            let questions = match &config.question_seed {
                Some(path) => load_seed(path)?,
                None => Vec::new(),
            };
            tracing::info!("Using in-memory store with {} questions", questions.len());
            Arc::new(MemoryQuizStore::with_questions(questions))
        }
    };

    let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::new(config.jwt_secret.clone()));

    // Create AppState; picks the submission authenticator for this environment
    let state = AppState::new(store, verifier, config.clone());

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    // Start the server
    axum::serve(listener, app).await?;
    Ok(())
}

/// Connects with retry, then applies migrations.
async fn connect_postgres(config: &Config) -> Result<PgPool, BoxError> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or("DATABASE_URL must be set")?;

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    return Err(format!("Failed to connect to database after 5 retries: {e}").into());
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations applied successfully.");

    Ok(pool)
}

/// Reads a JSON array of questions for the in-memory store.
fn load_seed(path: &Path) -> Result<Vec<Question>, BoxError> {
    let raw = std::fs::read_to_string(path)?;
    let questions: Vec<Question> = serde_json::from_str(&raw)?;
    Ok(questions)
}
