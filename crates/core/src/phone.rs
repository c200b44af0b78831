// E.164 phone number check

use crate::types::ValidationResult;
use regex::Regex;
use std::sync::OnceLock;

/// `+`, a non-zero leading digit, then 9 to 14 more digits.
const PHONE_PATTERN: &str = r"^\+[1-9][0-9]{9,14}$";

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("built-in phone pattern compiles"))
}

/// Check that `phone_number` is already formatted as E.164.
///
/// Spaces, dashes and parentheses are not stripped.
pub fn validate_phone(phone_number: &str) -> ValidationResult {
    let valid = phone_regex().is_match(phone_number);
    tracing::debug!(valid, "phone check");

    let message = if valid {
        "Valid E.164 phone format"
    } else {
        "Invalid phone format. Use E.164: +[country][number]"
    };
    ValidationResult::new(valid, phone_number, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_numbers() {
        for phone in ["+12025551234", "+447911123456", "+1234567890", "+123456789012345"] {
            let result = validate_phone(phone);
            assert!(result.valid, "{} should be valid", phone);
            assert_eq!(result.message, "Valid E.164 phone format");
        }
    }

    #[test]
    fn test_digit_count_bounds() {
        // 9 digits after '+': too short
        assert!(!validate_phone("+123456789").valid);
        // 10 digits: shortest valid
        assert!(validate_phone("+1234567890").valid);
        // 15 digits: longest valid
        assert!(validate_phone("+123456789012345").valid);
        // 16 digits: too long
        assert!(!validate_phone("+1234567890123456").valid);
    }

    #[test]
    fn test_invalid_numbers() {
        for phone in [
            "",
            "5551234",
            "12025551234",
            "+02025551234",
            "+1 202 555 1234",
            "+1-202-555-1234",
            "+1(202)5551234",
            "+1202555123a",
        ] {
            let result = validate_phone(phone);
            assert!(!result.valid, "{:?} should be invalid", phone);
            assert_eq!(
                result.message,
                "Invalid phone format. Use E.164: +[country][number]"
            );
            assert_eq!(result.input, phone);
        }
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        // Arabic-Indic digits
        assert!(!validate_phone("+١٢٣٤٥٦٧٨٩٠١").valid);
    }
}
