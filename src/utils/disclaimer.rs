// src/utils/disclaimer.rs

use regex::{Regex, RegexBuilder};

use crate::{error::AppError, utils::html::strip_tags};

/// Detects existing legal disclaimers and appends the standard one when missing.
#[derive(Debug, Clone)]
pub struct DisclaimerManager {
    indicators: Vec<Regex>,
    standard_text: String,
}

impl DisclaimerManager {
    /// The standard text must be plain text and must itself be recognized by
    /// the indicators, otherwise appending it would not be idempotent.
    pub fn new(indicators: &[String], standard_text: &str) -> Result<Self, AppError> {
        let indicators = indicators
            .iter()
            .map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;

        let standard_text = standard_text.trim().to_string();
        if standard_text.is_empty() || standard_text.contains(['<', '>', '"']) {
            return Err(AppError::InvalidPolicy(
                "Standard disclaimer must be non-empty plain text".to_string(),
            ));
        }

        let manager = Self {
            indicators,
            standard_text,
        };
        if !manager.has_disclaimer(Some(manager.standard_text.as_str())) {
            return Err(AppError::InvalidPolicy(
                "Standard disclaimer is not recognized by any disclaimer indicator".to_string(),
            ));
        }

        Ok(manager)
    }

    pub fn standard_text(&self) -> &str {
        &self.standard_text
    }

    /// The markup appended to long descriptions.
    pub fn block(&self) -> String {
        format!(
            "<p><em style=\"font-size: smaller\">{}</em></p>",
            self.standard_text
        )
    }

    pub fn has_disclaimer(&self, text: Option<&str>) -> bool {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return false;
        };

        let plain = strip_tags(text).to_lowercase();
        self.indicators.iter().any(|re| re.is_match(&plain))
    }

    /// Returns `long_text` with the standard disclaimer block appended, unless
    /// it already carries a disclaimer. The original content is kept verbatim.
    pub fn ensure_disclaimer(&self, long_text: Option<&str>) -> String {
        match long_text {
            None | Some("") => self.block(),
            Some(text) if self.has_disclaimer(Some(text)) => text.to_string(),
            Some(text) => {
                tracing::debug!("Appending standard disclaimer");
                format!("{}\n\n{}", text, self.block())
            }
        }
    }
}
