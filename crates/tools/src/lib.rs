//! # VaultMind Tools
//!
//! The built-in tool set. Each tool implements `core::Tool`; the
//! coordinator treats them all identically apart from the background
//! flag and the `vault_search` post-processing hook.
//!
//! Search and note tools operate on an in-memory vault so the engine can
//! be exercised end-to-end without file I/O; a production deployment
//! would swap in a real index behind the same tool names.

mod activity_log;
mod current_time;
mod note_write;
mod vault_search;
mod web_search;

pub use activity_log::ActivityLogTool;
pub use current_time::CurrentTimeTool;
pub use note_write::{NoteStore, NoteWriteTool};
pub use vault_search::{IndexedNote, VaultSearchTool};
pub use web_search::WebSearchTool;

use vaultmind_core::ToolRegistry;

/// A registry with the full built-in tool set, sharing one note store.
pub fn builtin_registry(notes: Vec<IndexedNote>) -> ToolRegistry {
    let store = NoteStore::new();
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(VaultSearchTool::new(notes)));
    registry.register(Box::new(WebSearchTool));
    registry.register(Box::new(CurrentTimeTool));
    registry.register(Box::new(NoteWriteTool::new(store)));
    registry.register(Box::new(ActivityLogTool::new()));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_expected_tools() {
        let registry = builtin_registry(vec![]);
        for name in [
            "vault_search",
            "web_search",
            "current_time",
            "note_write",
            "activity_log",
        ] {
            assert!(registry.get(name).is_some(), "missing tool {name}");
        }
        assert!(registry.is_background("activity_log"));
        assert!(!registry.is_background("vault_search"));
    }
}
