//! Conversation persistence contract.
//!
//! The run loop hands each finished turn to a `ConversationStore`; the
//! condense step reads recent turns back for its history window. Storage
//! engines live in their own crate.

use crate::message::ConversationId;
use crate::tool::SourceRef;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished user/assistant exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub conversation_id: ConversationId,
    pub user_input: String,
    pub assistant_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist a finished turn.
    async fn save_turn(&self, record: TurnRecord) -> crate::Result<()>;

    /// The most recent `limit` turns for a conversation, oldest first.
    async fn recent(
        &self,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> crate::Result<Vec<TurnRecord>>;
}
