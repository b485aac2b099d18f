//! Reasoning-stream normalization.
//!
//! Providers stream "reasoning" in at least five incompatible shapes (see
//! `ResponseChunk`). The normalizer classifies each incoming chunk into a
//! reasoning delta and a visible delta, then folds both into a single
//! canonical buffer where reasoning is wrapped in `<think>` blocks:
//!
//! ```text
//! \n<think>…reasoning…</think>…visible answer…
//! ```
//!
//! Alternating reasoning and visible content yields one open/close pair
//! per alternation. Finalization force-closes an open block.

use tracing::debug;
use vaultmind_core::ResponseChunk;

/// Opening delimiter, emitted once per reasoning block.
pub const THINK_OPEN: &str = "\n<think>";

/// Closing delimiter, emitted before the next visible character.
pub const THINK_CLOSE: &str = "</think>";

/// Rendered in place of reasoning the provider withholds.
const ENCRYPTED_PLACEHOLDER: &str = "[reasoning encrypted by provider]";

/// Folds a stream of vendor chunks into one canonical text buffer.
///
/// Single-threaded; the run loop feeds it one chunk at a time. `push`
/// returns the text appended by that chunk so the caller can forward the
/// delta to the live buffer without re-diffing.
#[derive(Debug, Default)]
pub struct StreamNormalizer {
    buffer: String,
    block_open: bool,
    /// Set once an explicit delta field is observed; reasoning-details
    /// snapshots are ignored from then on to avoid duplication.
    saw_delta: bool,
    /// Byte length of the reasoning-details snapshot already emitted.
    details_emitted: usize,
    encrypted_noted: bool,
    exclude_thinking: bool,
}

impl StreamNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A normalizer that drops reasoning entirely: no delimiters, no
    /// reasoning text, visible text passed through unchanged.
    pub fn excluding_thinking() -> Self {
        Self {
            exclude_thinking: true,
            ..Self::default()
        }
    }

    /// Process one chunk; returns the text this chunk contributed.
    pub fn push(&mut self, chunk: &ResponseChunk) -> String {
        let (reasoning, visible) = self.classify(chunk);
        let mut emitted = String::new();

        if let Some(delta) = reasoning {
            if !self.exclude_thinking {
                if !self.block_open {
                    emitted.push_str(THINK_OPEN);
                    self.block_open = true;
                }
                emitted.push_str(&delta);
            }
        }

        if let Some(text) = visible {
            if self.block_open {
                emitted.push_str(THINK_CLOSE);
                self.block_open = false;
            }
            emitted.push_str(&text);
        }

        self.buffer.push_str(&emitted);
        emitted
    }

    /// Finalize the stream: close a still-open reasoning block and return
    /// the complete normalized buffer.
    pub fn close(&mut self) -> String {
        if self.block_open {
            self.buffer.push_str(THINK_CLOSE);
            self.block_open = false;
        }
        debug!(len = self.buffer.len(), "Normalizer stream closed");
        self.buffer.clone()
    }

    /// The buffer accumulated so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Classify one chunk into `(reasoning_delta, visible_delta)`.
    ///
    /// Precedence: explicit delta > typed-part thinking element >
    /// top-level reasoning > encrypted flag > details snapshot (only
    /// while no explicit delta has ever been seen). Empty and absent
    /// fragments never contribute.
    fn classify(&mut self, chunk: &ResponseChunk) -> (Option<String>, Option<String>) {
        let mut reasoning = None;
        let mut visible = chunk.content.clone().filter(|s| !s.is_empty());

        if let Some(delta) = &chunk.reasoning_delta {
            self.saw_delta = true;
            if !delta.is_empty() {
                reasoning = Some(delta.clone());
            }
        } else if let Some(parts) = &chunk.parts {
            let mut think = String::new();
            let mut text = String::new();
            for part in parts {
                let Some(t) = &part.text else { continue };
                match part.kind.as_str() {
                    "thinking" => think.push_str(t),
                    "text" => text.push_str(t),
                    _ => {}
                }
            }
            if !think.is_empty() {
                reasoning = Some(think);
            }
            if !text.is_empty() {
                visible = Some(match visible {
                    Some(v) => v + &text,
                    None => text,
                });
            }
        } else if let Some(r) = chunk.reasoning.as_ref().filter(|s| !s.is_empty()) {
            reasoning = Some(r.clone());
        } else if chunk.reasoning_encrypted {
            if !self.encrypted_noted {
                self.encrypted_noted = true;
                reasoning = Some(ENCRYPTED_PLACEHOLDER.to_string());
            }
        } else if let Some(details) = &chunk.reasoning_details {
            if !self.saw_delta {
                // Snapshots are complete-so-far: emit only the new suffix.
                // A snapshot that does not extend the previous one lands
                // off a char boundary; ignore it like any malformed fragment
                let full: String = details
                    .iter()
                    .filter_map(|d| d.text.as_deref())
                    .collect();
                if full.len() > self.details_emitted && full.is_char_boundary(self.details_emitted)
                {
                    reasoning = Some(full[self.details_emitted..].to_string());
                    self.details_emitted = full.len();
                }
            }
        }

        (reasoning, visible)
    }
}
