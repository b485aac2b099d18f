//! UI sink — where the live message buffer goes.
//!
//! `update_current_message` is called after every buffer mutation so the
//! UI can re-render the in-progress response; `add_final_message` is
//! called once per turn with the finished text and its cited sources.

use crate::tool::SourceRef;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The finished assistant turn handed to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalMessage {
    pub text: String,
    pub sources: Vec<SourceRef>,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait UiSink: Send + Sync {
    /// Re-render the in-progress message buffer.
    async fn update_current_message(&self, text: &str);

    /// Deliver the finished turn.
    async fn add_final_message(&self, message: FinalMessage);
}

/// A sink that records everything it receives. Used across the workspace
/// for tests asserting on intermediate buffer states.
#[derive(Default)]
pub struct RecordingSink {
    updates: std::sync::Mutex<Vec<String>>,
    finals: std::sync::Mutex<Vec<FinalMessage>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All intermediate buffer snapshots, in order.
    pub fn updates(&self) -> Vec<String> {
        self.updates.lock().expect("updates lock poisoned").clone()
    }

    /// All finished turns.
    pub fn finals(&self) -> Vec<FinalMessage> {
        self.finals.lock().expect("finals lock poisoned").clone()
    }

    /// The most recent intermediate snapshot, if any.
    pub fn last_update(&self) -> Option<String> {
        self.updates
            .lock()
            .expect("updates lock poisoned")
            .last()
            .cloned()
    }
}

#[async_trait]
impl UiSink for RecordingSink {
    async fn update_current_message(&self, text: &str) {
        self.updates
            .lock()
            .expect("updates lock poisoned")
            .push(text.to_string());
    }

    async fn add_final_message(&self, message: FinalMessage) {
        self.finals
            .lock()
            .expect("finals lock poisoned")
            .push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_sink_captures_in_order() {
        let sink = RecordingSink::new();
        sink.update_current_message("a").await;
        sink.update_current_message("ab").await;
        sink.add_final_message(FinalMessage {
            text: "ab".into(),
            sources: vec![],
            timestamp: Utc::now(),
        })
        .await;

        assert_eq!(sink.updates(), vec!["a".to_string(), "ab".to_string()]);
        assert_eq!(sink.last_update().as_deref(), Some("ab"));
        assert_eq!(sink.finals().len(), 1);
        assert_eq!(sink.finals()[0].text, "ab");
    }
}
