// src/handlers/review.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    handlers::content::check_size,
    models::review::{EnhancementReviewRequest, ExtractionReviewRequest, ReviewResponse},
    policy::{ContentPolicy, ReviewedDescription},
};

/// Reviews an AI-enhanced description pair.
///
/// The long description is sanitized, given a disclaimer and scanned; the short
/// description is scanned only. Compliance findings are advisory and never
/// turn into an error.
pub async fn review_enhancement(
    State(policy): State<Arc<ContentPolicy>>,
    State(config): State<Config>,
    Json(payload): Json<EnhancementReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;
    check_size(&payload.long_description, &config)?;

    // 2. Run the pipeline off the async workers
    let reviewed = run_review(
        policy,
        payload.short_description,
        payload.long_description,
    )
    .await?;

    if reviewed.compliance.has_issues {
        tracing::info!(
            "Enhancement review raised {} compliance warning(s)",
            reviewed.compliance.warnings.len()
        );
    }

    Ok(Json(ReviewResponse::from(reviewed)))
}

/// Reviews a description pair extracted from a document, carrying the
/// extraction confidence through to the response.
pub async fn review_extraction(
    State(policy): State<Arc<ContentPolicy>>,
    State(config): State<Config>,
    Json(payload): Json<ExtractionReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;
    check_size(&payload.long_description, &config)?;

    // 2. Run the pipeline off the async workers
    let confidence = payload.confidence;
    let reviewed = run_review(
        policy,
        payload.short_description,
        payload.long_description,
    )
    .await?;
    let response = ReviewResponse::from(reviewed).with_confidence(confidence);

    if response.has_compliance_issues || response.low_confidence == Some(true) {
        tracing::info!(
            "Extraction review flagged: {} compliance warning(s), confidence {:.2}",
            response.compliance_warnings.len(),
            confidence
        );
    }

    Ok(Json(response))
}

async fn run_review(
    policy: Arc<ContentPolicy>,
    short_description: String,
    long_description: String,
) -> Result<ReviewedDescription, AppError> {
    tokio::task::spawn_blocking(move || {
        policy.review(
            Some(short_description.as_str()),
            Some(long_description.as_str()),
        )
    })
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}
