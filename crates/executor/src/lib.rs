//! # VaultMind Tool Execution Coordinator
//!
//! Runs one batch of tool calls per orchestration step with bounded
//! concurrency. Foreground calls are rendered live in the shared
//! [`TurnBuffer`] through the marker protocol; background calls run
//! silently. The returned result list is always in original call order;
//! marker updates happen in completion order.
//!
//! Cancellation is cooperative: in-flight calls are not killed, the
//! coordinator simply stops waiting on them, and every call lacking a
//! settled outcome is mapped to a synthetic failed result.
//!
//! [`TurnBuffer`]: vaultmind_protocol::TurnBuffer

mod coordinator;
mod postprocess;

pub use coordinator::{ExecutionContext, ToolExecutor};
pub use postprocess::post_process;
