//! Tool lifecycle events — the observability sink.
//!
//! The coordinator publishes a `Started` and a `Settled` event for every
//! call in a batch, foreground and background alike. Subscribers (logging,
//! tracing pipelines) filter for what they care about; publishing is
//! advisory and can never affect scheduling.

use crate::tool::OutcomeStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Lifecycle events for tool calls within one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolEvent {
    /// A call began executing
    Started {
        index: usize,
        tool_name: String,
        background: bool,
        timestamp: DateTime<Utc>,
    },

    /// A call reached a terminal outcome
    Settled {
        index: usize,
        tool_name: String,
        background: bool,
        status: OutcomeStatus,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for tool lifecycle events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<ToolEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: ToolEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ToolEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
