use crate::config::{AppState, ServerConfig};
use crate::events;
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod handlers;

/// Start the API server
pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.bind_addr();
    let state = AppState::new(&config);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on {}", addr);
    tracing::info!("SSE endpoint: http://{}/sse", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router
fn create_router(state: AppState) -> Router {
    Router::new()
        // Service metadata
        .route("/", get(service_info))
        .route("/info", get(service_info))
        .route("/health", get(health_check))
        // Validation routes
        .route("/validate/email", post(handlers::validate_email_handler))
        .route("/validate/phone", post(handlers::validate_phone_handler))
        .route("/validate/url", post(handlers::validate_url_handler))
        .route("/validate/regex", post(handlers::validate_regex_handler))
        // Streaming and tool-call transports
        .route("/sse", get(events::sse_handler))
        .route("/mcp", post(handlers::mcp_handler))
        .fallback(not_found)
        // Middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "vetta",
    }))
}

/// Service information endpoint
async fn service_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "vetta",
        "version": env!("CARGO_PKG_VERSION"),
        "transports": ["rest", "sse", "mcp-http"],
        "tools": state.mcp.registry().names(),
        "endpoints": {
            "email": "/validate/email",
            "phone": "/validate/phone",
            "url": "/validate/url",
            "regex": "/validate/regex",
            "health": "/health",
            "info": "/info",
            "sse": "/sse",
            "mcp": "/mcp",
        },
    }))
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not found")
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!(%detail, "Handler panicked");

    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Transport-level failure. Validation verdicts never take this path.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        Self::new(rejection.status(), "Invalid request body").with_details(rejection.body_text())
    }
}

/// JSON body extractor whose rejections are reported as [`ErrorResponse`]s.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use futures::StreamExt;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(&ServerConfig::default()))
    }

    async fn read_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        }
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        (response.status(), read_json(response).await)
    }

    async fn post_raw(uri: &str, body: impl Into<Body>) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        (response.status(), read_json(response).await)
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        post_raw(uri, body.to_string()).await
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "vetta");
    }

    #[tokio::test]
    async fn test_root_and_info_list_tools() {
        for uri in ["/", "/info"] {
            let (status, body) = get_json(uri).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(
                body["tools"],
                serde_json::json!([
                    "validate_email",
                    "validate_phone",
                    "validate_regex",
                    "validate_url"
                ])
            );
            assert_eq!(body["endpoints"]["sse"], "/sse");
        }
    }

    #[tokio::test]
    async fn test_validate_email() {
        let (status, body) =
            post_json("/validate/email", serde_json::json!({"email": "user@example.com"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "valid": true,
                "input": "user@example.com",
                "message": "Valid email format"
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_verdict_is_still_ok() {
        let (status, body) =
            post_json("/validate/email", serde_json::json!({"email": "invalid.email"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        assert_eq!(body["message"], "Invalid email format");
    }

    #[tokio::test]
    async fn test_validate_phone_field_aliases() {
        let (_, body) = post_json(
            "/validate/phone",
            serde_json::json!({"phone_number": "+12025551234"}),
        )
        .await;
        assert_eq!(body["valid"], true);

        let (_, body) =
            post_json("/validate/phone", serde_json::json!({"phone": "5551234"})).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["input"], "5551234");
    }

    #[tokio::test]
    async fn test_validate_url() {
        let (status, body) = post_json(
            "/validate/url",
            serde_json::json!({"url": "https://example.com"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["details"],
            serde_json::json!({"scheme": "https", "netloc": "example.com", "path": "/"})
        );

        let (_, body) = post_json("/validate/url", serde_json::json!({"url": "ftp://"})).await;
        assert_eq!(body["message"], "Invalid URL: missing domain");
    }

    #[tokio::test]
    async fn test_validate_regex() {
        let (status, body) = post_json(
            "/validate/regex",
            serde_json::json!({"text": "ABC123", "pattern": "^[A-Z]{3}\\d{3}$", "flags": ""}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["match"], "ABC123");
    }

    #[tokio::test]
    async fn test_validate_regex_integer_flags() {
        let (_, body) = post_json(
            "/validate/regex",
            serde_json::json!({
                "text": "hello",
                "pattern": "HELLO",
                "flags": 2,
                "description": "greeting"
            }),
        )
        .await;

        assert_eq!(body["valid"], true);
        assert_eq!(body["message"], "Pattern matched (case-insensitive)");
    }

    #[tokio::test]
    async fn test_validate_regex_bad_pattern() {
        let (status, body) = post_json(
            "/validate/regex",
            serde_json::json!({"text": "x", "pattern": "(unclosed"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        assert!(body.get("match").is_none());
        assert_eq!(body["pattern"], "(unclosed");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (status, body) = post_raw("/validate/email", "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_missing_field() {
        let (status, body) = post_json("/validate/url", serde_json::json!({"link": "x"})).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = get_json("/validate/iban").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn test_mcp_over_http() {
        let (status, body) = post_json(
            "/mcp",
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "tools/call",
                "params": {"name": "validate_phone", "arguments": {"phone_number": "+447911123456"}}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 7);
        assert_eq!(body["result"]["structuredContent"]["valid"], true);
    }

    #[tokio::test]
    async fn test_mcp_wrong_shape_is_jsonrpc_error() {
        let (status, body) =
            post_json("/mcp", serde_json::json!({"jsonrpc": "2.0", "id": 3})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 3);
        assert_eq!(body["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_mcp_notification_accepted() {
        let (status, body) = post_json(
            "/mcp",
            serde_json::json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_sse_sends_connected_first() {
        let response = app()
            .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

        let mut body = response.into_body().into_data_stream();
        let chunk = body.next().await.unwrap().unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();

        assert!(text.contains("event: connected"));
        assert!(text.contains(r#""status":"connected""#));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://frontend.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
