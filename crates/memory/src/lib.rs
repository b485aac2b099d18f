//! # VaultMind Memory
//!
//! Implementations of the `ConversationStore` contract. The run loop
//! hands every finished turn here and the condense step reads recent
//! turns back for its history window.

mod in_memory;

pub use in_memory::InMemoryStore;
