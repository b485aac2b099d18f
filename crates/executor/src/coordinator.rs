//! The bounded-concurrency batch coordinator.
//!
//! Per-call lifecycle: Pending → Dispatched → Settled. Foreground markers
//! for the whole batch are inserted, in batch order, before any call is
//! spawned, so the UI shows the full plan immediately. Calls then run
//! under a semaphore and report completion over an mpsc channel; the
//! collector settles markers in completion order while the final result
//! array stays in input order.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, error, info, warn};
use vaultmind_config::ParallelismConfig;
use vaultmind_core::error::ToolError;
use vaultmind_core::event::{EventBus, ToolEvent};
use vaultmind_core::sink::UiSink;
use vaultmind_core::tool::{ExecutionResult, OutcomeStatus, ToolCall, ToolOutcome, ToolRegistry};
use vaultmind_core::TurnCancellation;
use vaultmind_protocol::{Marker, TurnBuffer};

use crate::postprocess::post_process;

/// Synthetic result message when cancellation fired before a call settled.
const ABORTED_MESSAGE: &str = "Aborted";

/// Message used when a call never settled without a cancellation, which
/// indicates a fault in the coordinator itself.
const INCOMPLETE_MESSAGE: &str = "Tool call did not complete";

/// Everything one batch needs, passed explicitly. No globals.
#[derive(Clone)]
pub struct ExecutionContext {
    pub registry: Arc<ToolRegistry>,
    pub parallelism: ParallelismConfig,
    pub cancellation: TurnCancellation,
    pub event_bus: Arc<EventBus>,
    pub buffer: Arc<Mutex<TurnBuffer>>,
    pub sink: Arc<dyn UiSink>,
}

pub struct ToolExecutor;

impl ToolExecutor {
    /// Run one batch of tool calls and return a result per call, in the
    /// original call order, even on partial failure or cancellation.
    pub async fn run(batch: Vec<ToolCall>, ctx: &ExecutionContext) -> Vec<ExecutionResult> {
        if batch.is_empty() {
            return Vec::new();
        }

        insert_markers(&batch, ctx).await;

        let limit = ctx.parallelism.effective_limit();
        let sequential = !ctx.parallelism.enabled || batch.len() <= 1 || limit <= 1;
        info!(
            calls = batch.len(),
            limit,
            sequential,
            "Running tool batch"
        );

        let results = if sequential {
            run_sequential(&batch, ctx).await
        } else {
            run_parallel(&batch, ctx, limit).await
        };

        finalize(&batch, results, ctx).await
    }
}

/// Insert an executing marker for every foreground call, in batch order,
/// before any call starts running. One UI update for the whole batch.
async fn insert_markers(batch: &[ToolCall], ctx: &ExecutionContext) {
    let snapshot = {
        let mut buf = ctx.buffer.lock().expect("turn buffer lock poisoned");
        let mut inserted = false;
        for call in batch {
            if ctx.registry.is_background(&call.name) {
                continue;
            }
            buf.insert_executing_marker(&marker_for(call, ctx.registry.as_ref()));
            inserted = true;
        }
        inserted.then(|| buf.snapshot())
    };
    if let Some(text) = snapshot {
        ctx.sink.update_current_message(&text).await;
    }
}

/// Build the executing marker for a call from its tool's display
/// metadata. Unknown tools get bare defaults so their failure is visible.
fn marker_for(call: &ToolCall, registry: &ToolRegistry) -> Marker {
    let (display_name, icon, confirmation_message) = match registry.get(&call.name) {
        Some(tool) => (
            tool.display_name().to_string(),
            tool.icon().to_string(),
            tool.confirmation_message(),
        ),
        None => (call.name.clone(), "wrench".to_string(), format!("Running {}…", call.name)),
    };
    Marker {
        id: call.id.clone(),
        tool_name: call.name.clone(),
        display_name,
        icon,
        confirmation_message,
        is_executing: true,
        visible_content: String::new(),
        result: String::new(),
    }
}

async fn run_sequential(
    batch: &[ToolCall],
    ctx: &ExecutionContext,
) -> Vec<Option<ExecutionResult>> {
    let mut results: Vec<Option<ExecutionResult>> = vec![None; batch.len()];
    for (index, call) in batch.iter().enumerate() {
        if ctx.cancellation.is_cancelled() {
            break;
        }
        publish_started(index, call, ctx);
        let start = Instant::now();
        let outcome = ctx.registry.invoke(call).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        results[index] = Some(settle(index, call, outcome, duration_ms, ctx).await);
    }
    results
}

async fn run_parallel(
    batch: &[ToolCall],
    ctx: &ExecutionContext,
    limit: usize,
) -> Vec<Option<ExecutionResult>> {
    let semaphore = Arc::new(Semaphore::new(limit));
    let (tx, mut rx) = mpsc::channel::<(usize, Result<ToolOutcome, ToolError>, u64)>(batch.len());

    for (index, call) in batch.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let registry = Arc::clone(&ctx.registry);
        let event_bus = Arc::clone(&ctx.event_bus);
        let cancellation = ctx.cancellation.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };
            // Don't start new work on a cancelled turn
            if cancellation.is_cancelled() {
                return;
            }
            let background = registry.is_background(&call.name);
            event_bus.publish(ToolEvent::Started {
                index,
                tool_name: call.name.clone(),
                background,
                timestamp: Utc::now(),
            });
            debug!(index, tool = %call.name, "Tool call dispatched");
            let start = Instant::now();
            let outcome = registry.invoke(&call).await;
            let duration_ms = start.elapsed().as_millis() as u64;
            let _ = tx.send((index, outcome, duration_ms)).await;
        });
    }
    drop(tx);

    let mut results: Vec<Option<ExecutionResult>> = vec![None; batch.len()];
    let mut settled = 0;
    loop {
        tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => {
                warn!(
                    settled,
                    total = batch.len(),
                    "Batch cancelled, abandoning unsettled calls"
                );
                break;
            }
            msg = rx.recv() => {
                let Some((index, outcome, duration_ms)) = msg else {
                    break;
                };
                results[index] = Some(settle(index, &batch[index], outcome, duration_ms, ctx).await);
                settled += 1;
                if settled == batch.len() {
                    break;
                }
            }
        }
    }
    results
}

fn publish_started(index: usize, call: &ToolCall, ctx: &ExecutionContext) {
    ctx.event_bus.publish(ToolEvent::Started {
        index,
        tool_name: call.name.clone(),
        background: ctx.registry.is_background(&call.name),
        timestamp: Utc::now(),
    });
}

/// Settle one call: publish the event, post-process the outcome, and
/// update the foreground marker (completion order).
async fn settle(
    index: usize,
    call: &ToolCall,
    outcome: Result<ToolOutcome, ToolError>,
    duration_ms: u64,
    ctx: &ExecutionContext,
) -> ExecutionResult {
    let outcome = match outcome {
        Ok(o) => o,
        Err(e) => {
            warn!(index, tool = %call.name, error = %e, "Tool call failed");
            ToolOutcome::error(e.to_string())
        }
    };
    let background = ctx.registry.is_background(&call.name);
    ctx.event_bus.publish(ToolEvent::Settled {
        index,
        tool_name: call.name.clone(),
        background,
        status: outcome.status,
        duration_ms,
        timestamp: Utc::now(),
    });
    debug!(index, tool = %call.name, status = ?outcome.status, duration_ms, "Tool call settled");

    let result = post_process(&call.name, &outcome);
    if !background {
        let snapshot = {
            let mut buf = ctx.buffer.lock().expect("turn buffer lock poisoned");
            buf.settle_marker(&call.id, &result.display_result);
            buf.snapshot()
        };
        ctx.sink.update_current_message(&snapshot).await;
    }
    result
}

/// Fill every unsettled slot with a synthetic failed result and settle
/// its marker, so the batch always returns a complete, ordered array.
async fn finalize(
    batch: &[ToolCall],
    results: Vec<Option<ExecutionResult>>,
    ctx: &ExecutionContext,
) -> Vec<ExecutionResult> {
    let cancelled = ctx.cancellation.is_cancelled();
    let message = if cancelled {
        ABORTED_MESSAGE
    } else {
        INCOMPLETE_MESSAGE
    };

    let mut out = Vec::with_capacity(batch.len());
    let mut touched_buffer = false;
    for (index, slot) in results.into_iter().enumerate() {
        match slot {
            Some(result) => out.push(result),
            None => {
                let call = &batch[index];
                if cancelled {
                    debug!(index, tool = %call.name, "Synthesizing aborted result");
                } else {
                    error!(index, tool = %call.name, "Call never settled without cancellation");
                }
                ctx.event_bus.publish(ToolEvent::Settled {
                    index,
                    tool_name: call.name.clone(),
                    background: ctx.registry.is_background(&call.name),
                    status: OutcomeStatus::Aborted,
                    duration_ms: 0,
                    timestamp: Utc::now(),
                });
                if !ctx.registry.is_background(&call.name) {
                    ctx.buffer
                        .lock()
                        .expect("turn buffer lock poisoned")
                        .settle_marker(&call.id, message);
                    touched_buffer = true;
                }
                out.push(ExecutionResult {
                    tool_name: call.name.clone(),
                    success: false,
                    result: message.to_string(),
                    display_result: message.to_string(),
                    sources: Vec::new(),
                });
            }
        }
    }

    if touched_buffer {
        let snapshot = ctx
            .buffer
            .lock()
            .expect("turn buffer lock poisoned")
            .snapshot();
        ctx.sink.update_current_message(&snapshot).await;
    }
    out
}
