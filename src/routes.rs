// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{content, review, system},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (content, disclaimer, review, system).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Content Policy + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().expect("valid origin"),
        "http://127.0.0.1:3000".parse().expect("valid origin"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let disclaimer_routes = Router::new()
        .route("/check", post(content::check_disclaimer))
        .route("/ensure", post(content::ensure_disclaimer));

    let review_routes = Router::new()
        .route("/enhancement", post(review::review_enhancement))
        .route("/extraction", post(review::review_extraction));

    Router::new()
        .route("/api/health", get(system::health))
        .route("/api/policy/rules", get(system::get_rules))
        .route("/api/sanitize", post(content::sanitize))
        .route("/api/compliance", post(content::check_compliance))
        .nest("/api/disclaimer", disclaimer_routes)
        .nest("/api/review", review_routes)
        .fallback(system::not_found)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
