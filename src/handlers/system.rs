// src/handlers/system.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::Uri, response::IntoResponse};
use serde_json::json;

use crate::{error::AppError, policy::ContentPolicy};

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Returns the active rule set, so the policy can be audited independently
/// of the scanning code.
pub async fn get_rules(State(policy): State<Arc<ContentPolicy>>) -> impl IntoResponse {
    Json(policy.rules().clone())
}

/// JSON 404 for unknown routes.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
