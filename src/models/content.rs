// src/models/content.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserializes any JSON value into text: strings pass through, anything else
/// (null, numbers, objects) becomes the empty string.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

/// DTO for `POST /api/sanitize`.
#[derive(Debug, Deserialize)]
pub struct SanitizeRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub html: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SanitizeResponse {
    pub html: String,
}

/// DTO for `POST /api/compliance`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub short_text: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub long_text: String,
}

/// DTO for both disclaimer endpoints.
#[derive(Debug, Deserialize)]
pub struct DisclaimerRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclaimerCheckResponse {
    pub has_disclaimer: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisclaimerResponse {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_string_values_become_empty_text() {
        let req: ComplianceRequest =
            serde_json::from_str(r#"{"shortText": 42, "longText": null}"#).unwrap();
        assert_eq!(req.short_text, "");
        assert_eq!(req.long_text, "");

        let req: SanitizeRequest = serde_json::from_str(r#"{"html": {"a": 1}}"#).unwrap();
        assert_eq!(req.html, "");
    }

    #[test]
    fn missing_fields_become_empty_text() {
        let req: DisclaimerRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.text, "");
    }
}
