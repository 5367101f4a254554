// src/models/review.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::content::lenient_text,
    policy::{ReviewedDescription, is_low_confidence},
    utils::html::contains_markup,
};

/// DTO for `POST /api/review/enhancement`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementReviewRequest {
    /// Must be plain text; it is never passed through the HTML sanitizer.
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(
        length(max = 1000, message = "Short description must be at most 1000 chars"),
        custom(function = validate_plain_text)
    )]
    pub short_description: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub long_description: String,
}

/// DTO for `POST /api/review/extraction`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReviewRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(
        length(max = 1000, message = "Short description must be at most 1000 chars"),
        custom(function = validate_plain_text)
    )]
    pub short_description: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub long_description: String,

    /// Confidence reported by the extraction step.
    #[validate(range(min = 0.0, max = 1.0, message = "Confidence must be between 0 and 1"))]
    pub confidence: f64,
}

/// What the presentation layer receives for a reviewed description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub short_description: String,
    /// Sanitized HTML, with a disclaimer.
    pub long_description: String,
    pub compliance_warnings: Vec<String>,
    pub has_compliance_issues: bool,

    /// Only present for document-extraction flows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_confidence: Option<bool>,
}

impl ReviewResponse {
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self.low_confidence = Some(is_low_confidence(confidence));
        self
    }
}

impl From<ReviewedDescription> for ReviewResponse {
    fn from(reviewed: ReviewedDescription) -> Self {
        Self {
            short_description: reviewed.short_description,
            long_description: reviewed.long_description,
            has_compliance_issues: reviewed.compliance.has_issues,
            compliance_warnings: reviewed.compliance.warnings,
            confidence: None,
            low_confidence: None,
        }
    }
}

/// Rejects short descriptions containing tags or comments.
fn validate_plain_text(text: &str) -> Result<(), validator::ValidationError> {
    if contains_markup(text) {
        return Err(validator::ValidationError::new("markup_not_allowed")
            .with_message("Short description must be plain text".into()));
    }
    Ok(())
}
