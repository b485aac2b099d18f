//! Web search tool — stub that returns mock results.
//!
//! In production this would call a real search API. The stub returns
//! deterministic results so the run loop can be tested end-to-end
//! without network access.

use async_trait::async_trait;
use vaultmind_core::error::ToolError;
use vaultmind_core::tool::{Tool, ToolOutcome};

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns relevant results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    fn display_name(&self) -> &str {
        "Web Search"
    }

    fn icon(&self) -> &str {
        "globe"
    }

    fn confirmation_message(&self) -> String {
        "Searching the web…".into()
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;
        let num_results = arguments["num_results"].as_u64().unwrap_or(3).min(5) as usize;

        let mut output = String::new();
        for i in 1..=num_results {
            output.push_str(&format!(
                "{i}. Result {i} for \"{query}\" — https://example.com/search?q={}&p={i}\n",
                query.replace(' ', "+"),
            ));
        }
        Ok(ToolOutcome::ok(serde_json::json!(output)))
    }
}
