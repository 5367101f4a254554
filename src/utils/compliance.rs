// src/utils/compliance.rs

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::{
    error::AppError,
    models::policy::{KeywordRule, PatternRule},
    utils::html::strip_tags,
};

/// Outcome of a compliance scan. Advisory only; it never blocks a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub has_issues: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
struct KeywordMatcher {
    label: String,
    regex: Regex,
}

#[derive(Debug, Clone)]
struct PatternMatcher {
    regex: Regex,
    message: String,
}

/// Scans plain text against ordered keyword and manipulative-pattern tables.
#[derive(Debug, Clone)]
pub struct ComplianceScanner {
    keywords: Vec<KeywordMatcher>,
    patterns: Vec<PatternMatcher>,
}

impl ComplianceScanner {
    /// Compiles every rule once. Matching is always case-insensitive.
    pub fn new(keywords: &[KeywordRule], patterns: &[PatternRule]) -> Result<Self, AppError> {
        let keywords = keywords
            .iter()
            .map(|rule| {
                let pattern = match &rule.pattern {
                    Some(pattern) => pattern.clone(),
                    None => phrase_pattern(&rule.label),
                };
                Ok(KeywordMatcher {
                    label: rule.label.clone(),
                    regex: compile(&pattern)?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let patterns = patterns
            .iter()
            .map(|rule| {
                Ok(PatternMatcher {
                    regex: compile(&rule.pattern)?,
                    message: rule.message.clone(),
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Self { keywords, patterns })
    }

    /// Checks the short and long description together.
    ///
    /// Warnings are ordered keyword hits first, then pattern hits, each in
    /// rule order. Pattern messages appear at most once.
    pub fn check(&self, short_text: Option<&str>, long_text: Option<&str>) -> ComplianceReport {
        let combined = format!(
            "{} {}",
            short_text.unwrap_or_default(),
            long_text.unwrap_or_default()
        );
        let text = strip_tags(&combined);

        let mut warnings: Vec<String> = self
            .keywords
            .iter()
            .filter(|k| k.regex.is_match(&text))
            .map(|k| keyword_warning(&k.label))
            .collect();

        for pattern in &self.patterns {
            if pattern.regex.is_match(&text) && !warnings.contains(&pattern.message) {
                warnings.push(pattern.message.clone());
            }
        }

        ComplianceReport {
            has_issues: !warnings.is_empty(),
            warnings,
        }
    }
}

pub fn keyword_warning(label: &str) -> String {
    format!(
        "Contains \"{}\" - this language may require legal review.",
        label
    )
}

fn compile(pattern: &str) -> Result<Regex, AppError> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

/// Whole-word/phrase matcher for a label. Word boundaries are only added on
/// edges that are word characters, so labels like `100%` still match.
fn phrase_pattern(label: &str) -> String {
    let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    let body = words.join(r"\s+");

    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let trimmed = label.trim();
    let start = if is_word(trimmed.chars().next()) { r"\b" } else { "" };
    let end = if is_word(trimmed.chars().last()) { r"\b" } else { "" };

    format!("{}{}{}", start, body, end)
}
