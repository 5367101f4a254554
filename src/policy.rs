// src/policy.rs

use crate::{
    error::AppError,
    models::policy::PolicyRules,
    utils::{
        compliance::{ComplianceReport, ComplianceScanner},
        disclaimer::DisclaimerManager,
        html::HtmlSanitizer,
        style::StyleSanitizer,
    },
};

/// Extraction results below this confidence are flagged for manual review.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.80;

/// A short/long description pair after the full pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewedDescription {
    pub short_description: String,
    pub long_description: String,
    pub compliance: ComplianceReport,
}

/// The sanitizer, disclaimer manager and compliance scanner built from one
/// immutable rule set.
///
/// Everything is compiled at construction; afterwards the policy is read-only
/// and can be shared across request handlers without locking.
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    rules: PolicyRules,
    sanitizer: HtmlSanitizer,
    scanner: ComplianceScanner,
    disclaimers: DisclaimerManager,
}

impl ContentPolicy {
    pub fn new(rules: PolicyRules) -> Result<Self, AppError> {
        let style = StyleSanitizer::new(&rules.allowed_style_properties);
        let sanitizer = HtmlSanitizer::new(&rules.allowed_tags, style);
        let scanner =
            ComplianceScanner::new(&rules.prohibited_keywords, &rules.manipulative_patterns)?;
        let disclaimers =
            DisclaimerManager::new(&rules.disclaimer_indicators, &rules.standard_disclaimer)?;

        // Reviewed output is sanitized again on the next review, so the block must
        // come through the sanitizer untouched.
        let block = disclaimers.block();
        if sanitizer.sanitize(Some(block.as_str())) != block {
            return Err(AppError::InvalidPolicy(format!(
                "Allowed tags and style properties would rewrite the disclaimer block {}",
                block
            )));
        }

        tracing::info!(
            "Content policy loaded: {} tags, {} keywords, {} patterns, {} disclaimer indicators",
            rules.allowed_tags.len(),
            rules.prohibited_keywords.len(),
            rules.manipulative_patterns.len(),
            rules.disclaimer_indicators.len()
        );

        Ok(Self {
            rules,
            sanitizer,
            scanner,
            disclaimers,
        })
    }

    pub fn rules(&self) -> &PolicyRules {
        &self.rules
    }

    pub fn sanitize(&self, input: Option<&str>) -> String {
        self.sanitizer.sanitize(input)
    }

    pub fn check_compliance(
        &self,
        short_text: Option<&str>,
        long_text: Option<&str>,
    ) -> ComplianceReport {
        self.scanner.check(short_text, long_text)
    }

    pub fn has_disclaimer(&self, text: Option<&str>) -> bool {
        self.disclaimers.has_disclaimer(text)
    }

    pub fn ensure_disclaimer(&self, long_text: Option<&str>) -> String {
        self.disclaimers.ensure_disclaimer(long_text)
    }

    /// Runs the fixed pipeline: the long description is sanitized, then given a
    /// disclaimer, then scanned together with the short description. The short
    /// description is plain text and is passed through untouched.
    pub fn review(
        &self,
        short_description: Option<&str>,
        long_description: Option<&str>,
    ) -> ReviewedDescription {
        let sanitized = self.sanitize(long_description);
        let long_description = self.ensure_disclaimer(Some(sanitized.as_str()));
        let compliance =
            self.check_compliance(short_description, Some(long_description.as_str()));

        ReviewedDescription {
            short_description: short_description.unwrap_or_default().to_string(),
            long_description,
            compliance,
        }
    }
}

pub fn is_low_confidence(confidence: f64) -> bool {
    confidence < LOW_CONFIDENCE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ContentPolicy {
        ContentPolicy::new(PolicyRules::default()).unwrap()
    }

    #[test]
    fn review_sanitizes_then_appends_disclaimer_then_scans() {
        let reviewed = policy().review(
            Some("Guaranteed savings"),
            Some(r#"<p onclick="x()">Great <div>plan</div></p><script>steal()</script>"#),
        );

        assert_eq!(reviewed.short_description, "Guaranteed savings");
        assert!(reviewed.long_description.starts_with("<p>Great plan</p>\n\n<p><em"));
        assert!(!reviewed.long_description.contains("script"));
        assert!(reviewed.compliance.has_issues);
        assert_eq!(reviewed.compliance.warnings.len(), 1);
    }

    #[test]
    fn review_of_empty_input_is_just_the_disclaimer() {
        let p = policy();
        let reviewed = p.review(None, None);

        assert_eq!(reviewed.short_description, "");
        assert_eq!(reviewed.long_description, p.ensure_disclaimer(None));
        assert!(!reviewed.compliance.has_issues);
    }

    #[test]
    fn reviewing_reviewed_output_changes_nothing() {
        let p = policy();
        let first = p.review(Some("Plan"), Some("<P STYLE='font-size:14px'>Body</P>"));
        let second = p.review(Some("Plan"), Some(first.long_description.as_str()));
        assert_eq!(first, second);
    }

    #[test]
    fn scanning_sees_disclaimer_free_of_issues() {
        let p = policy();
        let block = p.ensure_disclaimer(None);
        assert!(!p.check_compliance(None, Some(block.as_str())).has_issues);
    }

    #[test]
    fn rules_that_strip_the_disclaimer_block_are_rejected() {
        let mut rules = PolicyRules::default();
        rules.allowed_tags.retain(|t| t != "em");
        assert!(matches!(
            ContentPolicy::new(rules),
            Err(AppError::InvalidPolicy(_))
        ));

        let mut rules = PolicyRules::default();
        rules.allowed_style_properties = vec!["font-style".to_string()];
        assert!(matches!(
            ContentPolicy::new(rules),
            Err(AppError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn narrower_rules_that_keep_the_block_still_review_stably() {
        let mut rules = PolicyRules::default();
        rules.allowed_tags = vec!["p".to_string(), "em".to_string()];
        let p = ContentPolicy::new(rules).unwrap();

        let first = p.review(Some("Plan"), Some("<ul><li><b>Towing</b></li></ul>"));
        let second = p.review(Some("Plan"), Some(first.long_description.as_str()));
        assert!(first.long_description.starts_with("Towing\n\n<p><em"));
        assert_eq!(first, second);
    }

    #[test]
    fn low_confidence_boundary() {
        assert!(is_low_confidence(0.79));
        assert!(!is_low_confidence(0.80));
        assert!(!is_low_confidence(1.0));
    }

    #[test]
    fn policy_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ContentPolicy>();
    }
}
