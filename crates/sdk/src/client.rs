//! Main client for the Vetta SDK.

use crate::config::{with_trailing_slash, ClientConfig, RetryConfig};
use crate::error::{VettaError, VettaResult};
use crate::transport::{HttpTransport, RawResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use url::Url;
use vetta_core::{UrlDetails, ValidationResult};

/// Liveness payload served by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

/// Bodies the validation routes may answer with.
#[derive(Deserialize)]
#[serde(untagged)]
enum VerdictBody {
    Direct(ValidationResult),
    Wrapped { detail: ValidationResult },
}

impl From<VerdictBody> for ValidationResult {
    fn from(body: VerdictBody) -> Self {
        match body {
            VerdictBody::Direct(result) | VerdictBody::Wrapped { detail: result } => result,
        }
    }
}

/// Client for a remote validation server.
///
/// Cheap to clone; build one at startup and hand it to whoever needs it.
#[derive(Debug, Clone)]
pub struct ValidationClient {
    config: Arc<ClientConfig>,
    http: HttpTransport,
}

impl ValidationClient {
    /// Create a new client builder.
    pub fn builder() -> ValidationClientBuilder {
        ValidationClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> VettaResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Fetch the server's liveness status.
    pub async fn health(&self) -> VettaResult<HealthStatus> {
        self.http.get("health").await
    }

    /// Check an email address, surfacing transport failures as errors.
    pub async fn try_validate_email(&self, email: &str) -> VettaResult<ValidationResult> {
        self.post_validation("validate/email", &json!({ "email": email }))
            .await
    }

    /// Check an E.164 phone number, surfacing transport failures as errors.
    pub async fn try_validate_phone(&self, phone_number: &str) -> VettaResult<ValidationResult> {
        self.post_validation("validate/phone", &json!({ "phone_number": phone_number }))
            .await
    }

    /// Check an HTTP(S) URL, surfacing transport failures as errors.
    pub async fn try_validate_url(&self, url: &str) -> VettaResult<ValidationResult> {
        self.post_validation("validate/url", &json!({ "url": url }))
            .await
    }

    /// Search `text` for `pattern`, surfacing transport failures as errors.
    pub async fn try_validate_regex(
        &self,
        text: &str,
        pattern: &str,
        flags: &str,
    ) -> VettaResult<ValidationResult> {
        self.post_validation(
            "validate/regex",
            &json!({ "text": text, "pattern": pattern, "flags": flags }),
        )
        .await
    }

    /// Check an email address. Transport failures become an invalid verdict.
    pub async fn validate_email(&self, email: &str) -> ValidationResult {
        self.try_validate_email(email)
            .await
            .unwrap_or_else(|err| transport_failure(email, &err))
    }

    /// Check an E.164 phone number. Transport failures become an invalid verdict.
    pub async fn validate_phone(&self, phone_number: &str) -> ValidationResult {
        self.try_validate_phone(phone_number)
            .await
            .unwrap_or_else(|err| transport_failure(phone_number, &err))
    }

    /// Check an HTTP(S) URL. Transport failures become an invalid verdict
    /// with empty `details`.
    pub async fn validate_url(&self, url: &str) -> ValidationResult {
        self.try_validate_url(url).await.unwrap_or_else(|err| {
            transport_failure(url, &err).with_details(UrlDetails::default())
        })
    }

    /// Search `text` for `pattern`. Transport failures become an invalid
    /// verdict that echoes the pattern.
    pub async fn validate_regex(&self, text: &str, pattern: &str, flags: &str) -> ValidationResult {
        self.try_validate_regex(text, pattern, flags)
            .await
            .unwrap_or_else(|err| transport_failure(text, &err).with_pattern(pattern))
    }

    async fn post_validation(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> VettaResult<ValidationResult> {
        let raw = self.http.post_raw(path, body).await?;
        decode_verdict(raw)
    }
}

/// A verdict is accepted from any status; other bodies only count on success.
fn decode_verdict(raw: RawResponse) -> VettaResult<ValidationResult> {
    match serde_json::from_str::<VerdictBody>(&raw.body) {
        Ok(body) => Ok(body.into()),
        Err(_) if !raw.is_success() => Err(VettaError::from_response(raw.status, &raw.body)),
        Err(e) => Err(e.into()),
    }
}

fn transport_failure(input: &str, err: &VettaError) -> ValidationResult {
    warn!(error = %err, "Validation request failed");
    ValidationResult::new(false, input, format!("API Error: {}", err))
}

/// Builder for creating a ValidationClient.
pub struct ValidationClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl ValidationClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
        }
    }

    /// Set the base URL of the validation server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> VettaResult<ValidationClient> {
        let base_url_str = self
            .base_url
            .ok_or_else(|| VettaError::Config("base_url is required".to_string()))?;

        let base_url = Url::parse(&base_url_str)?;

        let config = ClientConfig {
            base_url: with_trailing_slash(base_url),
            timeout: self.timeout,
            retry_config: self.retry_config,
        };

        ValidationClient::from_config(config)
    }
}

impl Default for ValidationClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ValidationClient {
        ValidationClient::builder()
            .base_url(server.uri())
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let err = ValidationClient::builder().build().unwrap_err();
        assert!(matches!(err, VettaError::Config(_)));
    }

    #[test]
    fn test_builder_rejects_bad_base_url() {
        let err = ValidationClient::builder()
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, VettaError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_validate_email() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/validate/email"))
            .and(body_json(json!({"email": "user@example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "valid": true,
                "input": "user@example.com",
                "message": "Valid email format"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).validate_email("user@example.com").await;
        assert!(result.valid);
        assert_eq!(result.message, "Valid email format");
    }

    #[tokio::test]
    async fn test_validate_phone_sends_phone_number() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/validate/phone"))
            .and(body_json(json!({"phone_number": "0123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "valid": false,
                "input": "0123",
                "message": "Invalid phone format. Use E.164: +[country][number]"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).validate_phone("0123").await;
        assert!(!result.valid);
        assert!(result.message.contains("E.164"));
    }

    #[tokio::test]
    async fn test_validate_regex_decodes_match() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/validate/regex"))
            .and(body_json(json!({"text": "Hello123", "pattern": "\\d+", "flags": ""})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "valid": true,
                "input": "Hello123",
                "pattern": "\\d+",
                "match": "123",
                "message": "Pattern matched"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .validate_regex("Hello123", "\\d+", "")
            .await;
        assert!(result.valid);
        assert_eq!(result.matched.as_deref(), Some("123"));
        assert_eq!(result.pattern.as_deref(), Some("\\d+"));
    }

    #[tokio::test]
    async fn test_detail_wrapper_on_client_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/validate/email"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "detail": {
                    "valid": false,
                    "input": "nope",
                    "message": "Invalid email format"
                }
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).try_validate_email("nope").await.unwrap();
        assert!(!result.valid);
        assert_eq!(result.message, "Invalid email format");
    }

    #[tokio::test]
    async fn test_direct_verdict_on_client_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/validate/url"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "valid": false,
                "input": "ftp://",
                "message": "Invalid URL: missing domain",
                "details": {"scheme": "ftp"}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).validate_url("ftp://").await;
        assert!(!result.valid);
        assert_eq!(result.message, "Invalid URL: missing domain");
        assert_eq!(result.details, Some(UrlDetails::scheme_only("ftp")));
    }

    #[tokio::test]
    async fn test_server_error_becomes_invalid_verdict() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/validate/email"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let err = client.try_validate_email("a@b.co").await.unwrap_err();
        assert!(matches!(err, VettaError::Api { status: 500, .. }));

        let result = client.validate_email("a@b.co").await;
        assert!(!result.valid);
        assert_eq!(result.input, "a@b.co");
        assert!(result.message.starts_with("API Error: "));
        assert!(result.message.contains("boom"));
    }

    #[tokio::test]
    async fn test_undecodable_success_is_json_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/validate/phone"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .try_validate_phone("+12025550123")
            .await
            .unwrap_err();
        assert!(matches!(err, VettaError::Json(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ValidationClient::builder()
            .base_url(format!("http://{}", addr))
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap();

        let result = client.validate_url("https://example.com").await;
        assert!(!result.valid);
        assert!(result.message.starts_with("API Error: "));
        assert_eq!(result.details, Some(UrlDetails::default()));

        let result = client.validate_regex("abc", "b", "i").await;
        assert!(!result.valid);
        assert_eq!(result.pattern.as_deref(), Some("b"));
        assert_eq!(result.matched, None);
    }

    #[tokio::test]
    async fn test_retries_until_verdict() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/validate/email"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/validate/email"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "valid": true,
                "input": "user@example.com",
                "message": "Valid email format"
            })))
            .mount(&server)
            .await;

        let client = ValidationClient::builder()
            .base_url(server.uri())
            .retry_config(RetryConfig {
                initial_backoff: Duration::from_millis(1),
                ..Default::default()
            })
            .build()
            .unwrap();

        assert!(client.validate_email("user@example.com").await.valid);
    }

    #[tokio::test]
    async fn test_base_url_with_prefix() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vetta/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "service": "vetta"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ValidationClient::builder()
            .base_url(format!("{}/vetta", server.uri()))
            .build()
            .unwrap();

        let health = client.health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, "vetta");
    }
}
