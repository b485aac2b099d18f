//! Vault search tool.
//!
//! Searches an in-memory note index with keyword scoring. The payload is
//! a JSON array of `{title, path, score, content}` hits; the coordinator
//! expands it into an LLM context block and citation sources.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use vaultmind_core::error::ToolError;
use vaultmind_core::tool::{Tool, ToolOutcome};

/// One note in the index.
#[derive(Debug, Clone)]
pub struct IndexedNote {
    pub title: String,
    pub path: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct SearchHit<'a> {
    title: &'a str,
    path: &'a str,
    score: f32,
    content: &'a str,
}

pub struct VaultSearchTool {
    notes: Vec<IndexedNote>,
    limit: usize,
}

impl VaultSearchTool {
    pub fn new(notes: Vec<IndexedNote>) -> Self {
        Self { notes, limit: 5 }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Fraction of query terms present in the note, title hits doubled.
    fn score(note: &IndexedNote, terms: &[String]) -> f32 {
        if terms.is_empty() {
            return 0.0;
        }
        let content = note.content.to_lowercase();
        let title = note.title.to_lowercase();
        let mut hits = 0.0;
        for term in terms {
            if title.contains(term.as_str()) {
                hits += 2.0;
            } else if content.contains(term.as_str()) {
                hits += 1.0;
            }
        }
        hits / (terms.len() as f32 * 2.0)
    }
}

#[async_trait]
impl Tool for VaultSearchTool {
    fn name(&self) -> &str {
        "vault_search"
    }

    fn description(&self) -> &str {
        "Search the user's notes vault. Returns matching notes with titles, paths, relevance scores, and content."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    fn display_name(&self) -> &str {
        "Vault Search"
    }

    fn icon(&self) -> &str {
        "search"
    }

    fn confirmation_message(&self) -> String {
        "Searching your vault…".into()
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let mut scored: Vec<(f32, &IndexedNote)> = self
            .notes
            .iter()
            .map(|n| (Self::score(n, &terms), n))
            .filter(|(s, _)| *s > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.limit);

        debug!(query, hits = scored.len(), "Vault search completed");

        let hits: Vec<SearchHit> = scored
            .iter()
            .map(|(score, note)| SearchHit {
                title: &note.title,
                path: &note.path,
                score: *score,
                content: &note.content,
            })
            .collect();

        Ok(ToolOutcome::ok(serde_json::to_value(hits).map_err(
            |e| ToolError::ExecutionFailed {
                tool_name: "vault_search".into(),
                reason: e.to_string(),
            },
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultmind_core::tool::OutcomeStatus;

    fn sample_index() -> Vec<IndexedNote> {
        vec![
            IndexedNote {
                title: "Rust ownership".into(),
                path: "dev/rust-ownership.md".into(),
                content: "Notes on the borrow checker and ownership rules.".into(),
            },
            IndexedNote {
                title: "Garden plan".into(),
                path: "home/garden.md".into(),
                content: "Tomatoes go in the south bed.".into(),
            },
        ]
    }

    #[tokio::test]
    async fn finds_matching_notes_ranked() {
        let tool = VaultSearchTool::new(sample_index());
        let outcome = tool
            .invoke(serde_json::json!({"query": "rust ownership"}))
            .await
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Ok);
        let hits = outcome.payload.unwrap();
        let hits = hits.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["path"], "dev/rust-ownership.md");
        assert!(hits[0]["score"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn no_match_returns_empty_payload() {
        let tool = VaultSearchTool::new(sample_index());
        let outcome = tool
            .invoke(serde_json::json!({"query": "quantum chromodynamics"}))
            .await
            .unwrap();
        assert_eq!(outcome.payload.unwrap().as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn missing_query_is_invalid() {
        let tool = VaultSearchTool::new(vec![]);
        let err = tool.invoke(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn display_metadata() {
        let tool = VaultSearchTool::new(vec![]);
        assert_eq!(tool.display_name(), "Vault Search");
        assert_eq!(tool.icon(), "search");
        assert!(!tool.background());
    }
}
