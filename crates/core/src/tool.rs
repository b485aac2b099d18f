//! Tool trait — the abstraction over assistant capabilities.
//!
//! Tools are what give the assistant the ability to act: search the vault,
//! search the web, answer time queries, write notes. The coordinator only
//! needs a tool's name, its background flag, and an `invoke` function; the
//! display metadata exists so foreground tools can be rendered live in the
//! message buffer while they run.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A request to invoke a tool, produced by intent resolution.
///
/// Immutable once dispatched into the coordinator for a given step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation ID tying this call to its marker and its result
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// Terminal status of a single tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The tool ran and produced a payload
    Ok,
    /// The tool ran and failed
    Error,
    /// Cancellation fired before the tool settled
    Aborted,
}

/// The raw outcome of one tool invocation, before post-processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub status: OutcomeStatus,

    /// Structured payload on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,

    /// Error description when status is not `Ok`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn ok(payload: serde_json::Value) -> Self {
        Self {
            status: OutcomeStatus::Ok,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            payload: None,
            error: Some(message.into()),
        }
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Aborted,
            payload: None,
            error: Some(message.into()),
        }
    }
}

/// A document reference extracted from a search-type tool's payload,
/// accumulated across a batch for citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Human-readable title (usually the note title)
    pub title: String,

    /// Vault-relative path
    pub path: String,

    /// Relevance score from the search backend
    pub score: f32,
}

/// The per-call result produced exactly once by the coordinator.
///
/// `result` is what the LLM and conversation memory see; `display_result`
/// is what the marker in the UI shows (possibly truncated).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub tool_name: String,
    pub success: bool,
    pub result: String,
    pub display_result: String,

    /// Sources contributed by this call, if it was a search-type tool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
}

/// The core Tool trait.
///
/// The coordinator treats every tool identically apart from the
/// `background` flag: background tools run silently, foreground tools get
/// a live marker in the message buffer.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "vault_search").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Whether this tool runs silently, with no visible marker.
    fn background(&self) -> bool {
        false
    }

    /// Name shown in the live marker. Defaults to the tool name.
    fn display_name(&self) -> &str {
        self.name()
    }

    /// Icon identifier for the live marker.
    fn icon(&self) -> &str {
        "wrench"
    }

    /// Short message shown in the marker while the call is executing.
    fn confirmation_message(&self) -> String {
        format!("Running {}…", self.display_name())
    }

    /// Invoke the tool with the given arguments.
    async fn invoke(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError>;
}

/// A registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Whether the named tool is a background tool. Unknown names are
    /// treated as foreground so their failure is at least visible.
    pub fn is_background(&self, name: &str) -> bool {
        self.get(name).map(|t| t.background()).unwrap_or(false)
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<crate::provider::ToolDefinition> {
        self.tools
            .values()
            .map(|t| crate::provider::ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    /// Invoke a tool call, mapping a missing tool to an error outcome.
    pub async fn invoke(&self, call: &ToolCall) -> Result<ToolOutcome, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        tool.invoke(call.arguments.clone()).await
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn invoke(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
            Ok(ToolOutcome::ok(arguments["text"].clone()))
        }
    }

    struct SilentTool;

    #[async_trait]
    impl Tool for SilentTool {
        fn name(&self) -> &str {
            "silent"
        }
        fn description(&self) -> &str {
            "Does nothing visibly"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }
        fn background(&self) -> bool {
            true
        }
        async fn invoke(&self, _arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
            Ok(ToolOutcome::ok(serde_json::Value::Null))
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn background_flag_from_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry.register(Box::new(SilentTool));
        assert!(!registry.is_background("echo"));
        assert!(registry.is_background("silent"));
        // Unknown tools default to foreground
        assert!(!registry.is_background("missing"));
    }

    #[tokio::test]
    async fn registry_invoke_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let call = ToolCall {
            id: "call_1".into(),
            name: "echo".into(),
            arguments: serde_json::json!({"text": "hello vault"}),
        };
        let outcome = registry.invoke(&call).await.unwrap();
        assert_eq!(outcome.status, OutcomeStatus::Ok);
        assert_eq!(outcome.payload.unwrap(), serde_json::json!("hello vault"));
    }

    #[tokio::test]
    async fn registry_invoke_missing_tool() {
        let registry = ToolRegistry::new();
        let call = ToolCall {
            id: "call_1".into(),
            name: "nonexistent".into(),
            arguments: serde_json::json!({}),
        };
        let err = registry.invoke(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn default_display_metadata() {
        let tool = EchoTool;
        assert_eq!(tool.display_name(), "echo");
        assert_eq!(tool.icon(), "wrench");
        assert!(tool.confirmation_message().contains("echo"));
    }

    #[test]
    fn outcome_constructors() {
        let ok = ToolOutcome::ok(serde_json::json!(1));
        assert_eq!(ok.status, OutcomeStatus::Ok);
        assert!(ok.error.is_none());

        let err = ToolOutcome::error("boom");
        assert_eq!(err.status, OutcomeStatus::Error);
        assert_eq!(err.error.as_deref(), Some("boom"));

        let aborted = ToolOutcome::aborted("Aborted");
        assert_eq!(aborted.status, OutcomeStatus::Aborted);
    }
}
