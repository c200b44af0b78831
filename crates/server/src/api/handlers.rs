use super::ApiJson;
use crate::config::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vetta_core::{
    validate_email, validate_phone, validate_regex_with_flags, validate_url, RegexFlags,
    ValidationResult,
};

// Every validation route answers 200 with the verdict, valid or not.
// Only malformed request bodies produce a 4xx.

#[derive(Debug, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Validate an email address
pub async fn validate_email_handler(
    ApiJson(req): ApiJson<EmailRequest>,
) -> Json<ValidationResult> {
    Json(validate_email(&req.email))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhoneRequest {
    #[serde(alias = "phone")]
    pub phone_number: String,
}

/// Validate an E.164 phone number
pub async fn validate_phone_handler(
    ApiJson(req): ApiJson<PhoneRequest>,
) -> Json<ValidationResult> {
    Json(validate_phone(&req.phone_number))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

/// Validate an HTTP/HTTPS URL
pub async fn validate_url_handler(ApiJson(req): ApiJson<UrlRequest>) -> Json<ValidationResult> {
    Json(validate_url(&req.url))
}

/// Flags as letters (`"im"`) or as an integer bit set (`10`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagsInput {
    Letters(String),
    Bits(u32),
}

impl From<FlagsInput> for RegexFlags {
    fn from(input: FlagsInput) -> Self {
        match input {
            FlagsInput::Letters(letters) => RegexFlags::parse(&letters),
            FlagsInput::Bits(bits) => RegexFlags::from_bits(bits),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegexRequest {
    pub text: String,
    pub pattern: String,
    #[serde(default)]
    pub flags: Option<FlagsInput>,
    /// Free-form label for the pattern, logged but not echoed
    #[serde(default)]
    pub description: Option<String>,
}

/// Validate text against a caller-supplied pattern
pub async fn validate_regex_handler(
    ApiJson(req): ApiJson<RegexRequest>,
) -> Json<ValidationResult> {
    let flags = req.flags.map(RegexFlags::from).unwrap_or_default();
    if let Some(description) = &req.description {
        tracing::debug!(%description, "Regex check");
    }
    Json(validate_regex_with_flags(&req.text, &req.pattern, flags))
}

/// Handle a single JSON-RPC message
pub async fn mcp_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(message): ApiJson<serde_json::Value>,
) -> Response {
    match state.mcp.handle_value(message).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
