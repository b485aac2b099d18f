//! # VaultMind Core
//!
//! Domain types, traits, and error definitions for the VaultMind
//! orchestration engine. Beyond async primitives and serialization it
//! carries no I/O, transport, or framework dependencies — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod cancel;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod sink;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use cancel::{CancelReason, TurnCancellation};
pub use error::{Error, Result};
pub use event::{EventBus, ToolEvent};
pub use message::{Conversation, ConversationId, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ResponseChunk};
pub use sink::{FinalMessage, UiSink};
pub use store::{ConversationStore, TurnRecord};
pub use tool::{
    ExecutionResult, OutcomeStatus, SourceRef, Tool, ToolCall, ToolOutcome, ToolRegistry,
};
