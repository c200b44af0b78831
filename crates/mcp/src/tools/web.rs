// URL tool

use super::{invalid_arguments, verdict};
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, json_schema_string, Tool};
use anyhow::Result;
use serde::Deserialize;
use vetta_core::validate_url;

/// Tool to check HTTP/HTTPS URLs
pub struct UrlTool;

#[derive(Debug, Deserialize)]
struct UrlArgs {
    url: String,
}

#[async_trait::async_trait]
impl Tool for UrlTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "validate_url".to_string(),
            description: "Validate URL format (HTTP/HTTPS only) and report its scheme, \
                          network location and path."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "url": json_schema_string("URL to validate")
                }),
                vec!["url"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: UrlArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => return Ok(invalid_arguments("validate_url", e)),
        };
        verdict(&validate_url(&args.url))
    }
}
