// HTTP/HTTPS URL check

use crate::types::{UrlDetails, ValidationResult};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use url::Url;

/// RFC 3986 component split: scheme, `//authority`, path, query, fragment.
/// Every input matches; components that are not present come back as `None`.
const URI_COMPONENTS: &str =
    r"(?s)^(?:([A-Za-z][A-Za-z0-9+.\-]*):)?(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$";

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

fn uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URI_COMPONENTS).expect("built-in URI pattern compiles"))
}

/// Reason a URL was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("Invalid URL: missing domain")]
    MissingDomain { scheme: Option<String> },

    #[error("Invalid URL scheme. Only HTTP/HTTPS allowed")]
    InvalidScheme { scheme: String },

    #[error("URL parsing error: {0}")]
    Malformed(String),
}

impl UrlError {
    fn details(&self) -> UrlDetails {
        match self {
            Self::MissingDomain { scheme } => {
                UrlDetails::scheme_only(scheme.as_deref().unwrap_or("none"))
            }
            Self::InvalidScheme { scheme } => UrlDetails::scheme_only(scheme.as_str()),
            Self::Malformed(_) => UrlDetails::default(),
        }
    }
}

struct UriParts<'a> {
    /// Lowercased
    scheme: Option<String>,
    authority: Option<&'a str>,
    path: &'a str,
}

fn split(input: &str) -> Result<UriParts<'_>, UrlError> {
    let caps = uri_regex()
        .captures(input)
        .ok_or_else(|| UrlError::Malformed("unrecognised URI syntax".to_string()))?;

    let authority = caps.get(2).map(|m| m.as_str());
    if let Some(authority) = authority {
        if authority.contains('[') != authority.contains(']') {
            return Err(UrlError::Malformed("Invalid IPv6 URL".to_string()));
        }
    }

    Ok(UriParts {
        scheme: caps.get(1).map(|m| m.as_str().to_ascii_lowercase()),
        authority: authority.filter(|a| !a.is_empty()),
        path: caps.get(3).map_or("", |m| m.as_str()),
    })
}

/// Leading C0 controls and spaces are dropped; tab, CR and LF are removed anywhere.
fn strip_ignored(input: &str) -> Cow<'_, str> {
    let trimmed = input.trim_start_matches(|c: char| c <= ' ');
    if trimmed.contains(|c: char| matches!(c, '\t' | '\r' | '\n')) {
        Cow::Owned(
            trimmed
                .chars()
                .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
                .collect(),
        )
    } else {
        Cow::Borrowed(trimmed)
    }
}

/// Classify `input`, returning the reported components on success.
///
/// A missing authority is reported ahead of a wrong scheme.
pub fn check_url(input: &str) -> Result<UrlDetails, UrlError> {
    let cleaned = strip_ignored(input);
    let parts = split(&cleaned)?;

    let Some(authority) = parts.authority else {
        return Err(UrlError::MissingDomain {
            scheme: parts.scheme,
        });
    };

    let scheme = match parts.scheme {
        Some(scheme) if ALLOWED_SCHEMES.contains(&scheme.as_str()) => scheme,
        other => {
            return Err(UrlError::InvalidScheme {
                scheme: other.unwrap_or_else(|| "none".to_string()),
            })
        }
    };

    // Host and port syntax is left to a full WHATWG parse.
    Url::parse(&cleaned).map_err(|e| UrlError::Malformed(e.to_string()))?;

    let path = if parts.path.is_empty() { "/" } else { parts.path };

    Ok(UrlDetails {
        scheme: Some(scheme),
        netloc: Some(authority.to_string()),
        path: Some(path.to_string()),
    })
}

/// Check that `url` is an absolute HTTP or HTTPS URL with a host.
pub fn validate_url(url: &str) -> ValidationResult {
    match check_url(url) {
        Ok(details) => {
            ValidationResult::new(true, url, "Valid HTTP/HTTPS URL").with_details(details)
        }
        Err(e) => {
            tracing::debug!(reason = %e, "url check failed");
            ValidationResult::new(false, url, e.to_string()).with_details(e.details())
        }
    }
}
