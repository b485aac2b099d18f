//! The live per-turn message buffer.
//!
//! One `TurnBuffer` exists per assistant turn. It only ever grows by
//! appending, with a single exception: settling a marker rewrites that
//! marker's fields in place. The run loop and the coordinator share it
//! behind a mutex; no two turns touch the same buffer because the run
//! loop never starts a turn before the previous one finishes or is
//! cancelled.

use crate::marker::{Marker, create_marker, update_marker};

#[derive(Debug, Default)]
pub struct TurnBuffer {
    text: String,
}

impl TurnBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append streamed text to the end of the buffer.
    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append an executing marker span for a freshly dispatched call.
    pub fn insert_executing_marker(&mut self, marker: &Marker) {
        self.text.push_str(&create_marker(marker));
        self.text.push('\n');
    }

    /// Settle the executing marker with the given id. No-op when the id
    /// is unknown or already settled.
    pub fn settle_marker(&mut self, id: &str, result: &str) {
        self.text = update_marker(&self.text, id, result);
    }

    /// The current buffer contents, for a UI update.
    pub fn snapshot(&self) -> String {
        self.text.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
