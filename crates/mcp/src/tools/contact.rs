// Email and phone number tools

use super::{invalid_arguments, verdict};
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, json_schema_string, Tool};
use anyhow::Result;
use serde::Deserialize;
use vetta_core::{validate_email, validate_phone};

/// Tool to check email address syntax
pub struct EmailTool;

#[derive(Debug, Deserialize)]
struct EmailArgs {
    email: String,
}

#[async_trait::async_trait]
impl Tool for EmailTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "validate_email".to_string(),
            description: "Validate email address format (username@domain.tld). \
                          Purely syntactic, no DNS lookup."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "email": json_schema_string("Email address to validate")
                }),
                vec!["email"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: EmailArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => return Ok(invalid_arguments("validate_email", e)),
        };
        verdict(&validate_email(&args.email))
    }
}

/// Tool to check E.164 phone numbers
pub struct PhoneTool;

#[derive(Debug, Deserialize)]
struct PhoneArgs {
    phone_number: String,
}

#[async_trait::async_trait]
impl Tool for PhoneTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "validate_phone".to_string(),
            description: "Validate phone number in E.164 format: + followed by \
                          10 to 15 digits, first digit non-zero. No reformatting is applied."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "phone_number": json_schema_string("Phone number to validate (must start with +)")
                }),
                vec!["phone_number"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: PhoneArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => return Ok(invalid_arguments("validate_phone", e)),
        };
        verdict(&validate_phone(&args.phone_number))
    }
}
