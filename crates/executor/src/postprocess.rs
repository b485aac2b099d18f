//! Per-tool outcome post-processing.
//!
//! The coordinator is tool-agnostic everywhere except here: a raw
//! `ToolOutcome` becomes an `ExecutionResult` with separate LLM-facing
//! and display-facing strings, and a search outcome additionally expands
//! into `SourceRef`s that accumulate across the batch for citation.

use serde::Deserialize;
use vaultmind_core::tool::{ExecutionResult, OutcomeStatus, SourceRef, ToolOutcome};

/// Display strings for search results are kept short; the full content
/// goes to the LLM, not the marker.
const SEARCH_DISPLAY_CEILING: usize = 300;

/// Display ceiling for every other tool.
const DISPLAY_CEILING: usize = 500;

/// One hit in a `vault_search` payload.
#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    content: String,
}

/// Map a raw outcome to the per-call result the run loop consumes.
pub fn post_process(tool_name: &str, outcome: &ToolOutcome) -> ExecutionResult {
    match outcome.status {
        OutcomeStatus::Ok => {
            let payload = outcome.payload.clone().unwrap_or(serde_json::Value::Null);
            if tool_name == "vault_search" {
                expand_search(tool_name, payload)
            } else {
                let text = payload_text(&payload);
                ExecutionResult {
                    tool_name: tool_name.to_string(),
                    success: true,
                    display_result: truncate_chars(&text, DISPLAY_CEILING),
                    result: text,
                    sources: Vec::new(),
                }
            }
        }
        OutcomeStatus::Error | OutcomeStatus::Aborted => {
            let message = outcome
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            ExecutionResult {
                tool_name: tool_name.to_string(),
                success: false,
                display_result: truncate_chars(&message, DISPLAY_CEILING),
                result: message,
                sources: Vec::new(),
            }
        }
    }
}

/// Expand a search payload into an LLM context block, a short display
/// string, and the cited sources.
fn expand_search(tool_name: &str, payload: serde_json::Value) -> ExecutionResult {
    let hits: Vec<SearchHit> = serde_json::from_value(payload).unwrap_or_default();
    if hits.is_empty() {
        return ExecutionResult {
            tool_name: tool_name.to_string(),
            success: true,
            result: "No matching notes found.".to_string(),
            display_result: "No matching notes found.".to_string(),
            sources: Vec::new(),
        };
    }

    let mut llm = String::new();
    let mut sources = Vec::with_capacity(hits.len());
    for hit in &hits {
        llm.push_str(&format!("### {} ({})\n{}\n\n", hit.title, hit.path, hit.content));
        sources.push(SourceRef {
            title: hit.title.clone(),
            path: hit.path.clone(),
            score: hit.score,
        });
    }

    let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
    let display = format!("Found {} notes: {}", hits.len(), titles.join(", "));

    ExecutionResult {
        tool_name: tool_name.to_string(),
        success: true,
        result: llm,
        display_result: truncate_chars(&display, SEARCH_DISPLAY_CEILING),
        sources,
    }
}

/// A string payload passes through as-is; anything else is serialized.
fn payload_text(payload: &serde_json::Value) -> String {
    match payload {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_payload_expands_into_sources() {
        let outcome = ToolOutcome::ok(json!([
            {"title": "Rust notes", "path": "dev/rust.md", "score": 0.91, "content": "Ownership rules."},
            {"title": "Daily log", "path": "daily/2026-08-24.md", "score": 0.55, "content": "Stand-up summary."}
        ]));
        let result = post_process("vault_search", &outcome);

        assert!(result.success);
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].path, "dev/rust.md");
        assert!(result.result.contains("### Rust notes (dev/rust.md)"));
        assert!(result.result.contains("Ownership rules."));
        assert!(result.display_result.starts_with("Found 2 notes:"));
    }

    #[test]
    fn empty_search_payload_has_no_sources() {
        let result = post_process("vault_search", &ToolOutcome::ok(json!([])));
        assert!(result.success);
        assert!(result.sources.is_empty());
        assert_eq!(result.result, "No matching notes found.");
    }

    #[test]
    fn search_display_is_truncated() {
        let hits: Vec<_> = (0..50)
            .map(|i| json!({"title": format!("A very long note title number {i}"), "path": format!("n/{i}.md"), "score": 0.5, "content": "body"}))
            .collect();
        let result = post_process("vault_search", &ToolOutcome::ok(json!(hits)));
        assert!(result.display_result.chars().count() <= SEARCH_DISPLAY_CEILING + 1);
        assert!(result.display_result.ends_with('…'));
        // The LLM-facing block is not truncated
        assert!(result.result.contains("number 49"));
    }

    #[test]
    fn plain_tool_string_payload_passes_through() {
        let result = post_process("current_time", &ToolOutcome::ok(json!("14:32 CEST")));
        assert!(result.success);
        assert_eq!(result.result, "14:32 CEST");
        assert_eq!(result.display_result, "14:32 CEST");
        assert!(result.sources.is_empty());
    }

    #[test]
    fn plain_tool_display_is_truncated_at_500() {
        let long = "x".repeat(900);
        let result = post_process("web_search", &ToolOutcome::ok(json!(long)));
        assert_eq!(result.result.len(), 900);
        assert_eq!(result.display_result.chars().count(), 501);
    }

    #[test]
    fn error_outcome_maps_to_failed_result() {
        let result = post_process("web_search", &ToolOutcome::error("rate limited"));
        assert!(!result.success);
        assert_eq!(result.result, "rate limited");
    }
}
