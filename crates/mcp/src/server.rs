// MCP server: JSON-RPC dispatch over any line-oriented async stream

use crate::protocol::{
    negotiate_protocol_version, CallToolParams, InitializeParams, InitializeResult,
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities,
    ServerInfo, ToolsCapability, JSONRPC_VERSION,
};
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

/// Longest accepted JSON-RPC line
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

pub struct McpServer {
    registry: ToolRegistry,
    info: ServerInfo,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            info: ServerInfo {
                name: "vetta".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve over stdin/stdout until stdin closes.
    pub async fn start(&self) -> Result<()> {
        tracing::info!(tools = self.registry.len(), "MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve newline-delimited JSON-RPC messages until `reader` is exhausted.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_MESSAGE_BYTES));

        while let Some(line) = lines.next().await {
            let response = match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_message(&line).await,
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    tracing::warn!("Discarding oversized message");
                    Some(JsonRpcResponse::error(
                        serde_json::Value::Null,
                        JsonRpcError::parse_error("message too large"),
                    ))
                }
                Err(LinesCodecError::Io(e)) => return Err(e).context("Failed to read message"),
            };

            if let Some(response) = response {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                writer
                    .write_all(&out)
                    .await
                    .context("Failed to write response")?;
                writer.flush().await?;
            }
        }

        tracing::info!("Input closed, MCP server stopping");
        Ok(())
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable message");
                Some(JsonRpcResponse::error(
                    serde_json::Value::Null,
                    JsonRpcError::parse_error(e.to_string()),
                ))
            }
        }
    }

    /// Handle a decoded JSON value that should be a JSON-RPC request.
    pub async fn handle_value(&self, value: serde_json::Value) -> Option<JsonRpcResponse> {
        let id = value.get("id").cloned().unwrap_or(serde_json::Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                tracing::debug!(error = %e, "Malformed request");
                Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ))
            }
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %request.method, "Handling request");
        let notification = request.is_notification();

        let outcome = if request.jsonrpc != JSONRPC_VERSION {
            Err(JsonRpcError::invalid_request(format!(
                "Unsupported jsonrpc version: {}",
                request.jsonrpc
            )))
        } else {
            self.dispatch(&request.method, request.params).await
        };

        if notification {
            if let Err(error) = outcome {
                tracing::debug!(method = %request.method, error = %error.message, "Notification failed");
            }
            return None;
        }

        let id = request.id.unwrap_or(serde_json::Value::Null);
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    async fn dispatch(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, JsonRpcError> {
        match method {
            "initialize" => {
                let params: InitializeParams = parse_params(params)?;
                if let Some(client) = &params.client_info {
                    tracing::info!(client = %client.name, version = %client.version, "Client connected");
                }
                to_result(InitializeResult {
                    protocol_version: negotiate_protocol_version(&params.protocol_version)
                        .to_string(),
                    capabilities: ServerCapabilities {
                        tools: Some(ToolsCapability {
                            list_changed: false,
                        }),
                    },
                    server_info: self.info.clone(),
                })
            }
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => to_result(ListToolsResult {
                tools: self.registry.list_schemas(),
            }),
            "tools/call" => {
                let params: CallToolParams = parse_params(params)?;
                let tool = self.registry.get(&params.name).ok_or_else(|| {
                    JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name))
                })?;
                let result = tool.execute(params.arguments).await.map_err(|e| {
                    tracing::error!(tool = %params.name, error = %e, "Tool execution failed");
                    JsonRpcError::internal_error(e.to_string())
                })?;
                to_result(result)
            }
            m if m.starts_with("notifications/") => Ok(serde_json::Value::Null),
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<serde_json::Value>) -> Result<T, JsonRpcError> {
    let params = params.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(e.to_string()))
}

fn to_result(value: impl serde::Serialize) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}
