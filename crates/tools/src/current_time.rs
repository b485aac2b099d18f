//! Current time tool.

use async_trait::async_trait;
use chrono::Utc;
use vaultmind_core::error::ToolError;
use vaultmind_core::tool::{Tool, ToolOutcome};

pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time (UTC)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "format": {
                    "type": "string",
                    "description": "strftime format string (default \"%Y-%m-%d %H:%M:%S UTC\")"
                }
            }
        })
    }

    fn display_name(&self) -> &str {
        "Current Time"
    }

    fn icon(&self) -> &str {
        "clock"
    }

    fn confirmation_message(&self) -> String {
        "Checking the time…".into()
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let format = arguments["format"]
            .as_str()
            .unwrap_or("%Y-%m-%d %H:%M:%S UTC");
        let now = Utc::now().format(format).to_string();
        Ok(ToolOutcome::ok(serde_json::json!(now)))
    }
}
