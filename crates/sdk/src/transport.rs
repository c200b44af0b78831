//! HTTP transport layer for the Vetta SDK.

use crate::config::ClientConfig;
use crate::error::{VettaError, VettaResult};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Status and body of a completed exchange, success or not.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport for making API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> VettaResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("vetta-sdk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Build a URL for a path relative to the base URL.
    fn build_url(&self, path: &str) -> VettaResult<url::Url> {
        Ok(self.config.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send a request, retrying transient failures.
    ///
    /// Returns the final response whatever its status.
    async fn execute_with_retry(&self, request_builder: RequestBuilder) -> VettaResult<Response> {
        let retry_config = &self.config.retry_config;
        let mut attempts = 0;

        loop {
            let request = request_builder
                .try_clone()
                .ok_or_else(|| VettaError::Config("Request cannot be cloned".to_string()))?;

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if attempts < retry_config.max_retries && retry_config.should_retry_status(status)
                    {
                        let backoff = retry_config.backoff_for_attempt(attempts);
                        warn!(
                            status = status,
                            attempt = attempts + 1,
                            backoff_ms = backoff.as_millis(),
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    let err = VettaError::from(e);
                    if attempts < retry_config.max_retries && err.is_retryable() {
                        let backoff = retry_config.backoff_for_attempt(attempts);
                        warn!(
                            attempt = attempts + 1,
                            backoff_ms = backoff.as_millis(),
                            error = %err,
                            "Request could not be delivered, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Execute a GET request, failing on a non-success status.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> VettaResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request");

        let response = self.execute_with_retry(self.client.get(url)).await?;
        let raw = read_raw(response).await?;
        if !raw.is_success() {
            return Err(VettaError::from_response(raw.status, &raw.body));
        }
        Ok(serde_json::from_str(&raw.body)?)
    }

    /// Execute a POST request and hand back the raw outcome.
    pub async fn post_raw<B: Serialize>(&self, path: &str, body: &B) -> VettaResult<RawResponse> {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST request");

        let response = self
            .execute_with_retry(self.client.post(url).json(body))
            .await?;
        read_raw(response).await
    }
}

async fn read_raw(response: Response) -> VettaResult<RawResponse> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok(RawResponse { status, body })
}
