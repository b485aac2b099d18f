//! Activity log tool — the one background tool in the built-in set.
//!
//! Background tools run silently: no marker, no visible result. The log
//! itself is only observable through the shared handle, which tests use
//! to assert the call actually ran.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use vaultmind_core::error::ToolError;
use vaultmind_core::tool::{Tool, ToolOutcome};

pub struct ActivityLogTool {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ActivityLogTool {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle to the recorded entries.
    pub fn entries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.entries)
    }
}

impl Default for ActivityLogTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ActivityLogTool {
    fn name(&self) -> &str {
        "activity_log"
    }

    fn description(&self) -> &str {
        "Record an activity log entry. Runs silently in the background."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The log entry"
                }
            },
            "required": ["message"]
        })
    }

    fn background(&self) -> bool {
        true
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let message = arguments["message"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'message' argument".into()))?;
        self.entries
            .lock()
            .expect("activity log lock poisoned")
            .push(message.to_string());
        Ok(ToolOutcome::ok(serde_json::json!("logged")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_entries() {
        let tool = ActivityLogTool::new();
        let entries = tool.entries();

        tool.invoke(serde_json::json!({"message": "searched vault"}))
            .await
            .unwrap();

        assert_eq!(entries.lock().unwrap().as_slice(), ["searched vault"]);
        assert!(tool.background());
    }
}
