pub mod contact;
pub mod pattern;
pub mod web;
mod registry;

pub use contact::{EmailTool, PhoneTool};
pub use pattern::RegexTool;
pub use registry::{json_schema_object, json_schema_string, Tool, ToolRegistry};
pub use web::UrlTool;

use crate::protocol::CallToolResult;
use std::sync::Arc;
use vetta_core::ValidationResult;

impl ToolRegistry {
    /// Registry holding the four validation tools.
    pub fn with_validators() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EmailTool));
        registry.register(Arc::new(PhoneTool));
        registry.register(Arc::new(UrlTool));
        registry.register(Arc::new(RegexTool));
        registry
    }
}

/// Wrap a verdict as a tool result. An invalid verdict is still a successful call.
fn verdict(result: &ValidationResult) -> anyhow::Result<CallToolResult> {
    Ok(CallToolResult::structured(serde_json::to_value(result)?))
}

fn invalid_arguments(tool: &str, err: serde_json::Error) -> CallToolResult {
    tracing::debug!(tool, error = %err, "Rejected tool arguments");
    CallToolResult::error(format!("Invalid arguments for {}: {}", tool, err))
}
