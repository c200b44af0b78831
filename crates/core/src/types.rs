use serde::{Deserialize, Serialize};

/// Verdict returned by every check.
///
/// `input` is always the caller's string, untouched. The optional fields are
/// only populated by the checks that own them: `pattern` and `match` by the
/// regex check, `details` by the URL check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub input: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<UrlDetails>,
}

impl ValidationResult {
    pub fn new(valid: bool, input: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            valid,
            input: input.into(),
            message: message.into(),
            pattern: None,
            matched: None,
            details: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_match(mut self, matched: impl Into<String>) -> Self {
        self.matched = Some(matched.into());
        self
    }

    pub fn with_details(mut self, details: UrlDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// Parsed URL components reported by the URL check.
///
/// Keys that were not determined are omitted, so a parse failure serializes
/// as an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netloc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl UrlDetails {
    pub fn scheme_only(scheme: impl Into<String>) -> Self {
        Self {
            scheme: Some(scheme.into()),
            ..Default::default()
        }
    }
}
