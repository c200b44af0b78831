// Custom regex tool

use super::{invalid_arguments, verdict};
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, json_schema_string, Tool};
use anyhow::Result;
use serde::Deserialize;
use vetta_core::validate_regex;

/// Tool to test text against a caller-supplied regular expression
pub struct RegexTool;

#[derive(Debug, Deserialize)]
struct RegexArgs {
    text: String,
    pattern: String,
    #[serde(default)]
    flags: String,
}

#[async_trait::async_trait]
impl Tool for RegexTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "validate_regex".to_string(),
            description: "Validate text against a custom regex pattern. Searches for the \
                          first match anywhere in the text. Look-around and back-references \
                          are not supported."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "text": json_schema_string("Text to validate against the pattern"),
                    "pattern": json_schema_string("Regular expression pattern to match"),
                    "flags": json_schema_string(
                        "Optional flags: i = ignore case, m = multiline, s = dotall, \
                         x = verbose, a = ASCII-only"
                    )
                }),
                vec!["text", "pattern"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: RegexArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => return Ok(invalid_arguments("validate_regex", e)),
        };
        verdict(&validate_regex(&args.text, &args.pattern, &args.flags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_regex_tool_match() {
        let result = RegexTool
            .execute(serde_json::json!({"text": "Hello123", "pattern": "\\d+"}))
            .await
            .unwrap();

        let structured = result.structured_content.unwrap();
        assert_eq!(structured["valid"], true);
        assert_eq!(structured["match"], "123");
    }

    #[tokio::test]
    async fn test_regex_tool_flags() {
        let result = RegexTool
            .execute(serde_json::json!({"text": "hello", "pattern": "HELLO", "flags": "i"}))
            .await
            .unwrap();

        let structured = result.structured_content.unwrap();
        assert_eq!(structured["message"], "Pattern matched (case-insensitive)");
    }

    #[tokio::test]
    async fn test_regex_tool_bad_pattern_is_verdict() {
        let result = RegexTool
            .execute(serde_json::json!({"text": "x", "pattern": "(unclosed"}))
            .await
            .unwrap();

        assert!(result.is_error.is_none());
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["valid"], false);
        assert!(structured.get("match").is_none());
    }
}
