//! Provider trait — the abstraction over the model backend.
//!
//! The orchestration engine never talks to a concrete LLM API; it sees a
//! `Provider` that can answer a request either as one complete response or
//! as an async sequence of `ResponseChunk`s. Model invocation internals
//! (transport, auth, retries) live outside this workspace.

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Whether to stream the response
    #[serde(default)]
    pub stream: bool,
}

fn default_temperature() -> f32 {
    0.7
}

impl ProviderRequest {
    /// A plain, non-streaming request with no tools.
    pub fn simple(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: None,
            tools: Vec::new(),
            stream: false,
        }
    }
}

/// A tool definition sent to the LLM so it knows what tools it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model in a complete response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedToolCall {
    pub id: String,
    pub name: String,
    /// Arguments as a JSON string, exactly as the model produced them
    pub arguments: String,
}

/// A complete (non-streaming) response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated text
    pub content: String,

    /// Tool invocations the model requested, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<RequestedToolCall>,

    /// Which model actually responded
    pub model: String,
}

/// One typed element of a content-part array (vendor shape (d)).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPart {
    /// Part kind: "thinking" or "text"
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub text: Option<String>,
}

/// One entry of a reasoning-details snapshot list (vendor shape (b)).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningDetail {
    #[serde(default)]
    pub text: Option<String>,
}

/// A single incremental chunk of a streaming model response.
///
/// Providers disagree on how "reasoning" arrives; all known shapes are
/// mutually exclusive optional fields on this one record, classified by
/// the stream normalizer — never by a type hierarchy:
///
/// - `reasoning_delta` — explicit token-by-token reasoning field
/// - `reasoning_details` — complete-so-far snapshot list
/// - `reasoning_encrypted` — provider withholds content entirely
/// - `parts` — typed content array with "thinking"/"text" elements
/// - `reasoning` — top-level reasoning field parallel to `content`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseChunk {
    /// Visible content delta
    #[serde(default)]
    pub content: Option<String>,

    /// Shape (a): explicit reasoning delta
    #[serde(default)]
    pub reasoning_delta: Option<String>,

    /// Shape (b): reasoning-details snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_details: Option<Vec<ReasoningDetail>>,

    /// Shape (c): reasoning exists but is encrypted by the provider
    #[serde(default)]
    pub reasoning_encrypted: bool,

    /// Shape (d): typed content-part array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<ChunkPart>>,

    /// Shape (e): top-level reasoning field
    #[serde(default)]
    pub reasoning: Option<String>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,
}

impl ResponseChunk {
    /// A chunk carrying only visible text.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A chunk carrying only an explicit reasoning delta.
    pub fn thinking(delta: impl Into<String>) -> Self {
        Self {
            reasoning_delta: Some(delta.into()),
            ..Self::default()
        }
    }

    /// The terminal chunk.
    pub fn finished() -> Self {
        Self {
            done: true,
            ..Self::default()
        }
    }
}

/// The receiver half of a model stream.
pub type ChunkStream = tokio::sync::mpsc::Receiver<Result<ResponseChunk, ProviderError>>;

/// The core Provider trait.
///
/// The run loop calls `complete()` for intent resolution and question
/// condensing, and `stream()` for answer generation.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider.
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;

    /// Send a request and get a stream of response chunks.
    ///
    /// Default implementation calls `complete()` and wraps the result as a
    /// single chunk followed by the terminal chunk.
    async fn stream(&self, request: ProviderRequest) -> Result<ChunkStream, ProviderError> {
        let response = self.complete(request).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(2);
        let _ = tx.send(Ok(ResponseChunk::text(response.content))).await;
        let _ = tx.send(Ok(ResponseChunk::finished())).await;
        Ok(rx)
    }
}
