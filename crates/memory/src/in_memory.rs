//! In-memory conversation store.
//!
//! Turns live in a Vec behind a mutex, in insertion order. Suitable for a
//! single-process assistant session and for tests; nothing survives a
//! restart.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;
use vaultmind_core::message::ConversationId;
use vaultmind_core::store::{ConversationStore, TurnRecord};
use vaultmind_core::Result;

#[derive(Default)]
pub struct InMemoryStore {
    turns: Mutex<Vec<TurnRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored turns, across all conversations.
    pub fn len(&self) -> usize {
        self.turns.lock().expect("turns lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn save_turn(&self, record: TurnRecord) -> Result<()> {
        debug!(
            conversation_id = %record.conversation_id,
            chars = record.assistant_text.len(),
            sources = record.sources.len(),
            "Saving turn"
        );
        self.turns.lock().expect("turns lock poisoned").push(record);
        Ok(())
    }

    async fn recent(
        &self,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<TurnRecord>> {
        let turns = self.turns.lock().expect("turns lock poisoned");
        let matching: Vec<TurnRecord> = turns
            .iter()
            .filter(|t| &t.conversation_id == conversation_id)
            .cloned()
            .collect();
        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(conversation_id: &ConversationId, user: &str, assistant: &str) -> TurnRecord {
        TurnRecord {
            conversation_id: conversation_id.clone(),
            user_input: user.into(),
            assistant_text: assistant.into(),
            sources: vec![],
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_and_read_back_in_order() {
        let store = InMemoryStore::new();
        let conv = ConversationId::new();

        store.save_turn(record(&conv, "q1", "a1")).await.unwrap();
        store.save_turn(record(&conv, "q2", "a2")).await.unwrap();

        let turns = store.recent(&conv, 10).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].user_input, "q1");
        assert_eq!(turns[1].user_input, "q2");
    }

    #[tokio::test]
    async fn recent_keeps_only_latest_turns() {
        let store = InMemoryStore::new();
        let conv = ConversationId::new();

        for i in 0..5 {
            store
                .save_turn(record(&conv, &format!("q{i}"), "a"))
                .await
                .unwrap();
        }

        let turns = store.recent(&conv, 2).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].user_input, "q3");
        assert_eq!(turns[1].user_input, "q4");
    }

    #[tokio::test]
    async fn conversations_are_isolated() {
        let store = InMemoryStore::new();
        let a = ConversationId::new();
        let b = ConversationId::new();

        store.save_turn(record(&a, "in a", "x")).await.unwrap();
        store.save_turn(record(&b, "in b", "y")).await.unwrap();

        let turns = store.recent(&a, 10).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].user_input, "in a");
        assert_eq!(store.len(), 2);
    }
}
