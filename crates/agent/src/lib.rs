//! # VaultMind Agent
//!
//! The top-level per-turn orchestration:
//!
//! ```text
//! IntentResolution → ToolExecution → ContextAssembly → Generation → Persistence
//! ```
//!
//! Linear, no backward transitions within one user turn. The run loop is
//! the only place the coordinator, the normalizer, and the detector are
//! composed; they never call each other directly.

mod context;
mod intent;
mod run_loop;

pub use context::{assemble_context, condense_question, dedup_sources};
pub use intent::{IntentResolver, LlmIntentResolver};
pub use run_loop::TurnRunner;
