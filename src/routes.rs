// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{method_not_allowed, questions, quiz, user},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Every route answers unsupported methods with a JSON 405.
/// * `/api/user` requires a verified bearer token.
/// * Applies global middleware (Trace, CORS) and injects `AppState`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route(
            "/questions",
            get(questions::list_questions).fallback(method_not_allowed),
        )
        .route(
            "/domains",
            get(questions::list_domains).fallback(method_not_allowed),
        )
        .route(
            "/quiz/submit",
            post(quiz::submit_quiz).fallback(method_not_allowed),
        )
        // Protected: the 405 fallback stays reachable without a token
        .route(
            "/user",
            post(user::upsert_user)
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                ))
                .fallback(method_not_allowed),
        );

    Router::new()
        .nest("/api", api_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
