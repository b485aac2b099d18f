//! The per-turn orchestration run loop.
//!
//! One `TurnRunner` serves many turns, but turns never overlap: the
//! caller must not start a new turn before the previous one persists or
//! is cancelled, which is what makes the shared buffer safe.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};
use vaultmind_config::AppConfig;
use vaultmind_core::event::EventBus;
use vaultmind_core::provider::{Provider, ProviderRequest};
use vaultmind_core::sink::{FinalMessage, UiSink};
use vaultmind_core::store::{ConversationStore, TurnRecord};
use vaultmind_core::tool::{ExecutionResult, ToolRegistry};
use vaultmind_core::{CancelReason, Conversation, Message, Result, TurnCancellation};
use vaultmind_executor::{ExecutionContext, ToolExecutor};
use vaultmind_protocol::TurnBuffer;
use vaultmind_stream::{ActionHandler, BlockDetector, DetectorEvent, StreamNormalizer};

use crate::context::{assemble_context, condense_question, dedup_sources};
use crate::intent::IntentResolver;

/// The top-level driver for one user turn:
/// intent resolution, tool execution, context assembly, streamed
/// generation, citation extraction, persistence handoff.
pub struct TurnRunner {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    resolver: Arc<dyn IntentResolver>,
    store: Arc<dyn ConversationStore>,
    sink: Arc<dyn UiSink>,
    event_bus: Arc<EventBus>,
    config: AppConfig,
    /// When set, the detector watches generation for note-write blocks
    note_handler: Option<Arc<dyn ActionHandler>>,
    exclude_thinking: bool,
}

impl TurnRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        resolver: Arc<dyn IntentResolver>,
        store: Arc<dyn ConversationStore>,
        sink: Arc<dyn UiSink>,
        event_bus: Arc<EventBus>,
        config: AppConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            resolver,
            store,
            sink,
            event_bus,
            config,
            note_handler: None,
            exclude_thinking: false,
        }
    }

    /// Enable note-edit mode: generation output is watched for
    /// note-write blocks executed through the given handler.
    pub fn with_note_handler(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        self.note_handler = Some(handler);
        self
    }

    /// Suppress reasoning content in the rendered output.
    pub fn with_exclude_thinking(mut self, exclude: bool) -> Self {
        self.exclude_thinking = exclude;
        self
    }

    /// Process one user turn end to end.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        user_input: &str,
        cancellation: TurnCancellation,
    ) -> Result<FinalMessage> {
        info!(conversation_id = %conversation.id, "Starting turn");
        conversation.push(Message::user(user_input));
        let buffer = Arc::new(Mutex::new(TurnBuffer::new()));

        // ── Intent resolution ──
        let mut calls = match self.resolver.resolve(conversation, &self.registry).await {
            Ok(calls) => calls,
            Err(e) => {
                warn!(error = %e, "Intent resolution failed, answering without tools");
                Vec::new()
            }
        };
        // Per-turn marker ids; provider-issued ids are not unique enough
        // to anchor buffer rewrites across turns
        for (i, call) in calls.iter_mut().enumerate() {
            call.id = format!("tc-{}", i + 1);
        }

        // ── Tool execution ──
        let ctx = ExecutionContext {
            registry: Arc::clone(&self.registry),
            parallelism: self.config.parallelism.clone(),
            cancellation: cancellation.clone(),
            event_bus: Arc::clone(&self.event_bus),
            buffer: Arc::clone(&buffer),
            sink: Arc::clone(&self.sink),
        };
        let results = ToolExecutor::run(calls, &ctx).await;

        let sources = dedup_sources(results.iter().flat_map(|r| r.sources.clone()).collect());

        // ── Context assembly ──
        let search_docs: Vec<String> = results
            .iter()
            .filter(|r| r.success && !r.sources.is_empty() && !r.result.is_empty())
            .map(|r| r.result.clone())
            .collect();

        let request = if search_docs.is_empty() {
            self.direct_request(conversation, &results)
        } else {
            debug!(documents = search_docs.len(), "Taking retrieval path");
            self.retrieval_request(conversation, user_input, &search_docs)
                .await
        };

        // ── Generation ──
        if !cancellation.is_cancelled() {
            self.stream_generation(request, &buffer, &cancellation).await;
        }

        let final_text = buffer
            .lock()
            .expect("turn buffer lock poisoned")
            .snapshot();

        // ── Persistence ──
        if cancellation.reason() == Some(CancelReason::NewConversation) {
            info!("Turn cancelled for a new conversation, skipping persistence");
        } else if let Err(e) = self
            .store
            .save_turn(TurnRecord {
                conversation_id: conversation.id.clone(),
                user_input: user_input.to_string(),
                assistant_text: final_text.clone(),
                sources: sources.clone(),
                timestamp: Utc::now(),
            })
            .await
        {
            warn!(error = %e, "Failed to persist turn");
        }

        conversation.push(Message::assistant(final_text.clone()));
        let final_message = FinalMessage {
            text: final_text,
            sources,
            timestamp: Utc::now(),
        };
        self.sink.add_final_message(final_message.clone()).await;
        info!(conversation_id = %conversation.id, "Turn finished");
        Ok(final_message)
    }

    /// Direct path: tool outputs (if any) appended inline to the user's
    /// message as context.
    fn direct_request(
        &self,
        conversation: &Conversation,
        results: &[ExecutionResult],
    ) -> ProviderRequest {
        let mut messages = conversation.messages.clone();
        if !results.is_empty()
            && let Some(last) = messages.last_mut()
        {
            let mut inline = String::from("\n\nTool results:\n");
            for r in results {
                inline.push_str(&format!("- {}: {}\n", r.tool_name, r.result));
            }
            last.content.push_str(&inline);
        }
        let mut request = ProviderRequest::simple(self.config.default_model.as_str(), messages);
        request.temperature = self.config.default_temperature;
        request.stream = true;
        request
    }

    /// Retrieval path: condense the question, assemble the context block
    /// under the character budget, ask for a grounded answer.
    async fn retrieval_request(
        &self,
        conversation: &Conversation,
        user_input: &str,
        documents: &[String],
    ) -> ProviderRequest {
        let history = match self
            .store
            .recent(&conversation.id, self.config.retrieval.history_window)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "History lookup failed, condensing without it");
                Vec::new()
            }
        };
        let question = match condense_question(
            self.provider.as_ref(),
            &self.config.default_model,
            &history,
            user_input,
        )
        .await
        {
            Ok(q) => q,
            Err(e) => {
                warn!(error = %e, "Question condensing failed, using raw input");
                user_input.to_string()
            }
        };
        let context = assemble_context(documents, self.config.retrieval.context_budget_chars);

        let messages = vec![
            Message::system(
                "Answer the question using only the provided notes. \
                 If the notes do not contain the answer, say so.",
            ),
            Message::user(format!("Notes:\n{context}\n\nQuestion: {question}")),
        ];
        let mut request = ProviderRequest::simple(self.config.default_model.as_str(), messages);
        request.temperature = self.config.default_temperature;
        request.stream = true;
        request
    }

    /// Drive the model stream through the normalizer (and the detector in
    /// note-edit mode), updating the UI after every processed chunk.
    async fn stream_generation(
        &self,
        request: ProviderRequest,
        buffer: &Arc<Mutex<TurnBuffer>>,
        cancellation: &TurnCancellation,
    ) {
        let mut normalizer = if self.exclude_thinking {
            StreamNormalizer::excluding_thinking()
        } else {
            StreamNormalizer::new()
        };
        let mut detector = self
            .note_handler
            .as_ref()
            .map(|h| BlockDetector::new(Arc::clone(h)));

        let mut rx = match self.provider.stream(request).await {
            Ok(rx) => rx,
            Err(e) => {
                warn!(error = %e, "Generation failed to start");
                self.append_and_update(buffer, &format!("\n\n**Error:** {e}"))
                    .await;
                return;
            }
        };

        loop {
            tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    info!("Generation cancelled");
                    break;
                }
                chunk = rx.recv() => {
                    match chunk {
                        None => break,
                        Some(Ok(chunk)) => {
                            let done = chunk.done;
                            let delta = normalizer.push(&chunk);
                            if !delta.is_empty() {
                                match detector.as_mut() {
                                    Some(det) => {
                                        let events = det.push(&delta).await;
                                        self.append_events(buffer, events).await;
                                    }
                                    None => self.append_and_update(buffer, &delta).await,
                                }
                            }
                            if done {
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "Generation stream failed");
                            self.append_and_update(buffer, &format!("\n\n**Error:** {e}"))
                                .await;
                            break;
                        }
                    }
                }
            }
        }

        // Held-back detector text precedes the forced block close
        if let Some(det) = detector.as_mut() {
            let events = det.flush();
            self.append_events(buffer, events).await;
        }
        let emitted = normalizer.buffer().len();
        let full = normalizer.close();
        if full.len() > emitted {
            self.append_and_update(buffer, &full[emitted..]).await;
        }
    }

    async fn append_and_update(&self, buffer: &Arc<Mutex<TurnBuffer>>, text: &str) {
        let snapshot = {
            let mut buf = buffer.lock().expect("turn buffer lock poisoned");
            buf.append(text);
            buf.snapshot()
        };
        self.sink.update_current_message(&snapshot).await;
    }

    async fn append_events(&self, buffer: &Arc<Mutex<TurnBuffer>>, events: Vec<DetectorEvent>) {
        for event in events {
            let text = match event {
                DetectorEvent::Text(t) => t,
                DetectorEvent::Notice(n) => format!("\n\n*{n}*\n\n"),
            };
            self.append_and_update(buffer, &text).await;
        }
    }
}
