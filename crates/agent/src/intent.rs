//! Intent resolution — deciding which tools a turn needs.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use vaultmind_core::error::ProviderError;
use vaultmind_core::provider::{Provider, ProviderRequest};
use vaultmind_core::tool::{ToolCall, ToolRegistry};
use vaultmind_core::Conversation;

/// Produces the tool calls for one orchestration step. An empty list
/// means the model answered (or will answer) directly.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    async fn resolve(
        &self,
        conversation: &Conversation,
        registry: &ToolRegistry,
    ) -> Result<Vec<ToolCall>, ProviderError>;
}

/// Default resolver: asks the provider with tool definitions attached
/// and maps its requested calls into `ToolCall`s.
pub struct LlmIntentResolver {
    provider: Arc<dyn Provider>,
    model: String,
}

impl LlmIntentResolver {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl IntentResolver for LlmIntentResolver {
    async fn resolve(
        &self,
        conversation: &Conversation,
        registry: &ToolRegistry,
    ) -> Result<Vec<ToolCall>, ProviderError> {
        let mut request = ProviderRequest::simple(&self.model, conversation.messages.clone());
        request.tools = registry.definitions();

        let response = self.provider.complete(request).await?;
        let calls: Vec<ToolCall> = response
            .tool_calls
            .into_iter()
            .map(|rc| ToolCall {
                id: rc.id,
                name: rc.name,
                // Arguments arrive as a JSON string; a malformed string
                // degrades to null and the tool reports the miss
                arguments: serde_json::from_str(&rc.arguments).unwrap_or_default(),
            })
            .collect();

        debug!(calls = calls.len(), "Intent resolved");
        Ok(calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultmind_core::provider::{ProviderResponse, RequestedToolCall};
    use vaultmind_core::Message;

    struct ToolCallingProvider;

    #[async_trait]
    impl Provider for ToolCallingProvider {
        fn name(&self) -> &str {
            "mock"
        }
        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            assert!(!request.tools.is_empty(), "definitions must be attached");
            Ok(ProviderResponse {
                content: String::new(),
                tool_calls: vec![
                    RequestedToolCall {
                        id: "call_1".into(),
                        name: "vault_search".into(),
                        arguments: r#"{"query":"rust"}"#.into(),
                    },
                    RequestedToolCall {
                        id: "call_2".into(),
                        name: "current_time".into(),
                        arguments: "not json".into(),
                    },
                ],
                model: "mock-model".into(),
            })
        }
    }

    struct PlainTextProvider;

    #[async_trait]
    impl Provider for PlainTextProvider {
        fn name(&self) -> &str {
            "mock"
        }
        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                content: "No tools needed.".into(),
                tool_calls: vec![],
                model: "mock-model".into(),
            })
        }
    }

    fn registry_with_echo() -> ToolRegistry {
        use vaultmind_core::error::ToolError;
        use vaultmind_core::tool::{Tool, ToolOutcome};

        struct EchoTool;

        #[async_trait]
        impl Tool for EchoTool {
            fn name(&self) -> &str {
                "echo"
            }
            fn description(&self) -> &str {
                "echoes"
            }
            fn parameters_schema(&self) -> serde_json::Value {
                serde_json::json!({"type": "object"})
            }
            async fn invoke(
                &self,
                arguments: serde_json::Value,
            ) -> Result<ToolOutcome, ToolError> {
                Ok(ToolOutcome::ok(arguments))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry
    }

    #[tokio::test]
    async fn maps_requested_calls_with_parsed_arguments() {
        let resolver = LlmIntentResolver::new(Arc::new(ToolCallingProvider), "mock-model");
        let mut conv = Conversation::new();
        conv.push(Message::user("find my rust notes"));

        let calls = resolver
            .resolve(&conv, &registry_with_echo())
            .await
            .unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "vault_search");
        assert_eq!(calls[0].arguments["query"], "rust");
        // Malformed argument string degrades to an empty object
        assert!(calls[1].arguments.is_null() || calls[1].arguments.as_object().is_some());
    }

    #[tokio::test]
    async fn plain_reply_yields_no_calls() {
        let resolver = LlmIntentResolver::new(Arc::new(PlainTextProvider), "mock-model");
        let conv = Conversation::new();
        let calls = resolver
            .resolve(&conv, &registry_with_echo())
            .await
            .unwrap();
        assert!(calls.is_empty());
    }
}
