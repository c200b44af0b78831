// Syntactic email address check (no DNS lookup)

use crate::types::ValidationResult;
use regex::Regex;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("built-in email pattern compiles"))
}

/// Check that `email` is `local-part@domain.tld` in its entirety.
pub fn validate_email(email: &str) -> ValidationResult {
    let valid = email_regex().is_match(email);
    tracing::debug!(valid, "email check");

    let message = if valid {
        "Valid email format"
    } else {
        "Invalid email format"
    };
    ValidationResult::new(valid, email, message)
}
