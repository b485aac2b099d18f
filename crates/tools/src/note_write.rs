//! Note write tool.
//!
//! Writes a note into a shared in-memory store. The same store backs the
//! detector's note-write action handler so both paths land in one place.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;
use vaultmind_core::error::ToolError;
use vaultmind_core::tool::{Tool, ToolOutcome};
use vaultmind_stream::ActionHandler;

/// Shared destination for written notes.
#[derive(Clone, Default)]
pub struct NoteStore {
    notes: Arc<Mutex<Vec<(String, String)>>>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write or overwrite a note at the given path.
    pub fn write(&self, path: &str, content: &str) {
        let mut notes = self.notes.lock().expect("note store lock poisoned");
        if let Some(existing) = notes.iter_mut().find(|(p, _)| p == path) {
            existing.1 = content.to_string();
        } else {
            notes.push((path.to_string(), content.to_string()));
        }
        debug!(path, chars = content.len(), "Note written");
    }

    pub fn read(&self, path: &str) -> Option<String> {
        self.notes
            .lock()
            .expect("note store lock poisoned")
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.clone())
    }

    pub fn len(&self) -> usize {
        self.notes.lock().expect("note store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The detector's note-write action lands in the same store as the tool.
#[async_trait]
impl ActionHandler for NoteStore {
    async fn execute(&self, path: &str, content: &str) -> Result<String, ToolError> {
        if path.trim().is_empty() {
            return Err(ToolError::InvalidArguments("Empty note path".into()));
        }
        self.write(path, content);
        Ok(format!("Note written to {path}"))
    }
}

pub struct NoteWriteTool {
    store: NoteStore,
}

impl NoteWriteTool {
    pub fn new(store: NoteStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for NoteWriteTool {
    fn name(&self) -> &str {
        "note_write"
    }

    fn description(&self) -> &str {
        "Create or overwrite a note in the vault at the given path."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Vault-relative path of the note"
                },
                "content": {
                    "type": "string",
                    "description": "Full note content"
                }
            },
            "required": ["path", "content"]
        })
    }

    fn display_name(&self) -> &str {
        "Write Note"
    }

    fn icon(&self) -> &str {
        "pencil"
    }

    fn confirmation_message(&self) -> String {
        "Writing a note…".into()
    }

    async fn invoke(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?;
        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?;

        self.store.write(path, content);
        Ok(ToolOutcome::ok(serde_json::json!(format!(
            "Note written to {path}"
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_and_overwrites() {
        let store = NoteStore::new();
        let tool = NoteWriteTool::new(store.clone());

        tool.invoke(serde_json::json!({"path": "a.md", "content": "v1"}))
            .await
            .unwrap();
        tool.invoke(serde_json::json!({"path": "a.md", "content": "v2"}))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.read("a.md").as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn action_handler_writes_into_same_store() {
        let store = NoteStore::new();
        let notice = store.execute("daily/log.md", "captured").await.unwrap();
        assert_eq!(notice, "Note written to daily/log.md");
        assert_eq!(store.read("daily/log.md").as_deref(), Some("captured"));

        let err = store.execute("  ", "x").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn missing_content_is_invalid() {
        let tool = NoteWriteTool::new(NoteStore::new());
        let err = tool
            .invoke(serde_json::json!({"path": "a.md"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
