// src/models/policy.rs

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    utils::{html::DEFAULT_ALLOWED_TAGS, style::DEFAULT_ALLOWED_STYLE_PROPERTIES},
};

const URGENCY_MESSAGE: &str = "Urgency language (e.g. \"act now\", \"limited time\") may be considered high-pressure sales and should be reviewed.";
const FEAR_MESSAGE: &str =
    "Fear-based messaging may be considered manipulative and should be reviewed.";
const SCARCITY_MESSAGE: &str =
    "Scarcity or exclusivity claims may be misleading and must be substantiated.";
const EXCLAMATION_MESSAGE: &str =
    "Repeated exclamation marks can read as high-pressure sales language.";

/// Appended to long descriptions that carry no disclaimer of their own.
pub const STANDARD_DISCLAIMER: &str = "This description is for informational purposes only and is not a contract. Coverage is subject to the terms, conditions, limitations and exclusions of the policy as issued. Please refer to your policy documents for complete details.";

/// A prohibited word or phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Shown to the user in the warning text.
    pub label: String,

    /// Case-insensitive regex. When absent, the label is matched as a whole
    /// word/phrase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// A manipulative-language pattern. Several rules may share one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    pub pattern: String,
    pub message: String,
}

/// The complete, immutable content policy.
///
/// Loaded once at startup, either built in or from a JSON file. Missing
/// fields fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyRules {
    pub allowed_tags: Vec<String>,
    pub allowed_style_properties: Vec<String>,
    pub prohibited_keywords: Vec<KeywordRule>,
    pub manipulative_patterns: Vec<PatternRule>,
    /// Case-insensitive regexes matched against lowercased, tag-stripped text.
    pub disclaimer_indicators: Vec<String>,
    pub standard_disclaimer: String,
}

impl PolicyRules {
    /// Reads a rules file in the same JSON shape served by `GET /api/policy/rules`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::InvalidPolicy(format!("Cannot read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            AppError::InvalidPolicy(format!("Cannot parse {}: {}", path.display(), e))
        })
    }
}

impl Default for PolicyRules {
    fn default() -> Self {
        Self {
            allowed_tags: to_strings(DEFAULT_ALLOWED_TAGS),
            allowed_style_properties: to_strings(DEFAULT_ALLOWED_STYLE_PROPERTIES),
            prohibited_keywords: default_keywords(),
            manipulative_patterns: default_patterns(),
            disclaimer_indicators: to_strings(&[
                r"\bdisclaimer\b",
                r"\bterms\s+and\s+conditions\b",
                r"\bsubject\s+to\s+(?:the\s+)?terms\b",
                r"\bfor\s+informational\s+purposes\b",
                r"\b(?:limitations|restrictions|exclusions)\s+(?:may\s+)?apply\b",
                r"\bconsult\s+(?:your|a)\s+(?:licensed\s+)?(?:agent|advisor|professional)\b",
                r"\bnot\s+an?\s+(?:contract|offer)\b",
                r"\brefer\s+to\s+(?:your|the)\s+policy\b",
            ]),
            standard_disclaimer: STANDARD_DISCLAIMER.to_string(),
        }
    }
}

fn default_keywords() -> Vec<KeywordRule> {
    let keyword = |label: &str, pattern: Option<&str>| KeywordRule {
        label: label.to_string(),
        pattern: pattern.map(str::to_string),
    };

    vec![
        keyword("guarantee", Some(r"\bguarantee[ds]?\b")),
        keyword("best", None),
        keyword("cheapest", None),
        keyword("lowest price", Some(r"\blowest\s+prices?\b")),
        keyword("risk-free", Some(r"\brisk[\s-]?free\b")),
        keyword("no risk", None),
        keyword("100%", None),
        keyword("ultimate", None),
        keyword("unlimited", None),
        keyword("instant approval", None),
        // Flagged unconditionally, even in benign sentences.
        keyword("never", None),
        keyword("always", None),
    ]
}

fn default_patterns() -> Vec<PatternRule> {
    let rule = |pattern: &str, message: &str| PatternRule {
        pattern: pattern.to_string(),
        message: message.to_string(),
    };

    vec![
        rule(r"\bact\s+now\b", URGENCY_MESSAGE),
        rule(r"\bhurry\b", URGENCY_MESSAGE),
        rule(r"\bdon['’]?t\s+wait\b", URGENCY_MESSAGE),
        rule(r"\blimited[\s-]time\b", URGENCY_MESSAGE),
        rule(r"\b(?:offer\s+)?expires?\s+(?:today|tonight|soon)\b", URGENCY_MESSAGE),
        rule(r"\blast\s+chance\b", URGENCY_MESSAGE),
        rule(
            r"\bdon['’]?t\s+(?:be|get)\s+left\s+(?:unprotected|uncovered|behind)\b",
            FEAR_MESSAGE,
        ),
        rule(r"\bbefore\s+it['’]?s\s+too\s+late\b", FEAR_MESSAGE),
        rule(r"\bcan\s+you\s+afford\s+not\s+to\b", FEAR_MESSAGE),
        rule(r"\bonly\s+(?:\d+|a\s+few)\s+(?:spots?|plans?|policies|left)\b", SCARCITY_MESSAGE),
        rule(r"\bexclusive\s+(?:offer|deal)\b", SCARCITY_MESSAGE),
        rule(r"!{2,}", EXCLAMATION_MESSAGE),
    ]
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
