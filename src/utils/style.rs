// src/utils/style.rs

use std::collections::HashSet;

/// CSS properties allowed inside a `style` attribute by default.
pub const DEFAULT_ALLOWED_STYLE_PROPERTIES: &[&str] = &["font-size", "font-style"];

/// Attack signatures; any declaration whose (case-folded) value contains one is dropped.
const BLOCKED_VALUE_MARKERS: &[&str] = &["expression", "javascript", "url("];

/// Quote breakout, CSS escapes and entity-encoded evasion.
const BLOCKED_VALUE_CHARS: &[char] = &['"', '\\', '&', '<', '>'];

/// Restricts inline style declarations to a whitelist of properties.
///
/// A declaration is either kept as `property: value` or dropped entirely;
/// values are never partially rewritten.
#[derive(Debug, Clone)]
pub struct StyleSanitizer {
    allowed_properties: HashSet<String>,
}

impl StyleSanitizer {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_properties = properties
            .into_iter()
            .map(|p| p.as_ref().trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Self { allowed_properties }
    }

    /// Sanitizes the value of a `style` attribute.
    ///
    /// Returns `None` when no declaration survives, in which case the caller
    /// should omit the attribute altogether.
    pub fn sanitize(&self, style: &str) -> Option<String> {
        let kept: Vec<String> = style
            .split(';')
            .filter_map(|declaration| self.sanitize_declaration(declaration))
            .collect();

        if kept.is_empty() {
            None
        } else {
            Some(kept.join("; "))
        }
    }

    pub fn is_allowed(&self, property: &str) -> bool {
        self.allowed_properties
            .contains(&property.trim().to_ascii_lowercase())
    }

    fn sanitize_declaration(&self, declaration: &str) -> Option<String> {
        let (property, value) = declaration.split_once(':')?;
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim();

        if value.is_empty() || !self.allowed_properties.contains(&property) {
            return None;
        }

        let folded = value.to_lowercase();
        if BLOCKED_VALUE_MARKERS.iter().any(|m| folded.contains(m))
            || value.contains(BLOCKED_VALUE_CHARS)
        {
            tracing::debug!("Dropping unsafe style value for '{}'", property);
            return None;
        }

        Some(format!("{}: {}", property, value))
    }
}

impl Default for StyleSanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_STYLE_PROPERTIES)
    }
}
