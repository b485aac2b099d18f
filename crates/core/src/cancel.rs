//! Cooperative turn cancellation.
//!
//! A single `TurnCancellation` is threaded from the top of the run loop
//! down into the coordinator and into generation. Cancellation is a
//! checked condition, never an interrupt: in-flight tool calls are not
//! killed, the loop simply stops waiting on or acting on further results.
//!
//! The reason matters at persistence time: a turn cancelled because the
//! user started a new conversation must not be written into the new
//! conversation's history.

use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Why a turn was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user stopped the current response
    UserStop,
    /// The user started a new conversation; the stale turn must not persist
    NewConversation,
}

/// Shared cancellation state for one turn.
#[derive(Clone)]
pub struct TurnCancellation {
    token: CancellationToken,
    reason: Arc<Mutex<Option<CancelReason>>>,
}

impl TurnCancellation {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            reason: Arc::new(Mutex::new(None)),
        }
    }

    /// Cancel the turn with the given reason. The first reason wins.
    pub fn cancel(&self, reason: CancelReason) {
        {
            let mut slot = self.reason.lock().expect("cancel reason lock poisoned");
            if slot.is_none() {
                *slot = Some(reason);
            }
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The recorded reason, if cancellation has fired.
    pub fn reason(&self) -> Option<CancelReason> {
        *self.reason.lock().expect("cancel reason lock poisoned")
    }

    /// Completes when cancellation fires. For use in `select!` arms.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

impl Default for TurnCancellation {
    fn default() -> Self {
        Self::new()
    }
}
