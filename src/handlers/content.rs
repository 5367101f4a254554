// src/handlers/content.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    config::Config,
    error::AppError,
    models::content::{
        ComplianceRequest, DisclaimerCheckResponse, DisclaimerRequest, DisclaimerResponse,
        SanitizeRequest, SanitizeResponse,
    },
    policy::ContentPolicy,
};

/// Sanitizes rich text against the tag and style whitelists.
pub async fn sanitize(
    State(policy): State<Arc<ContentPolicy>>,
    State(config): State<Config>,
    Json(payload): Json<SanitizeRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_size(&payload.html, &config)?;

    let html = tokio::task::spawn_blocking(move || policy.sanitize(Some(payload.html.as_str())))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(SanitizeResponse { html }))
}

/// Scans short and long text for prohibited and manipulative language.
pub async fn check_compliance(
    State(policy): State<Arc<ContentPolicy>>,
    State(config): State<Config>,
    Json(payload): Json<ComplianceRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_size(&payload.short_text, &config)?;
    check_size(&payload.long_text, &config)?;

    let report = policy.check_compliance(
        Some(payload.short_text.as_str()),
        Some(payload.long_text.as_str()),
    );
    Ok(Json(report))
}

/// Reports whether the text already carries a legal disclaimer.
pub async fn check_disclaimer(
    State(policy): State<Arc<ContentPolicy>>,
    State(config): State<Config>,
    Json(payload): Json<DisclaimerRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_size(&payload.text, &config)?;

    Ok(Json(DisclaimerCheckResponse {
        has_disclaimer: policy.has_disclaimer(Some(payload.text.as_str())),
    }))
}

/// Appends the standard disclaimer unless one is already present.
pub async fn ensure_disclaimer(
    State(policy): State<Arc<ContentPolicy>>,
    State(config): State<Config>,
    Json(payload): Json<DisclaimerRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_size(&payload.text, &config)?;

    Ok(Json(DisclaimerResponse {
        text: policy.ensure_disclaimer(Some(payload.text.as_str())),
    }))
}

/// Limits input size to prevent resource exhaustion.
pub(crate) fn check_size(text: &str, config: &Config) -> Result<(), AppError> {
    if text.chars().count() > config.max_description_chars {
        return Err(AppError::BadRequest(format!(
            "Text must be at most {} chars",
            config.max_description_chars
        )));
    }
    Ok(())
}
