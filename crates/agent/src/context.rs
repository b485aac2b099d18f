//! Context assembly for the retrieval-augmented path.

use std::collections::HashSet;
use tracing::debug;
use vaultmind_core::error::ProviderError;
use vaultmind_core::provider::{Provider, ProviderRequest};
use vaultmind_core::store::TurnRecord;
use vaultmind_core::tool::SourceRef;
use vaultmind_core::Message;

/// Condense the conversation history plus the current message into one
/// standalone question. With no history the input already stands alone.
pub async fn condense_question(
    provider: &dyn Provider,
    model: &str,
    history: &[TurnRecord],
    user_input: &str,
) -> Result<String, ProviderError> {
    if history.is_empty() {
        return Ok(user_input.to_string());
    }

    let mut prompt = String::from(
        "Rewrite the follow-up message as one standalone question that \
         can be understood without the conversation. Reply with the \
         question only.\n\nConversation:\n",
    );
    for turn in history {
        prompt.push_str(&format!(
            "User: {}\nAssistant: {}\n",
            turn.user_input, turn.assistant_text
        ));
    }
    prompt.push_str(&format!("\nFollow-up: {user_input}\n"));

    let response = provider
        .complete(ProviderRequest::simple(model, vec![Message::user(prompt)]))
        .await?;
    let condensed = response.content.trim().to_string();
    Ok(if condensed.is_empty() {
        user_input.to_string()
    } else {
        condensed
    })
}

/// Join retrieved documents into one context block under a hard
/// character budget.
///
/// When the total exceeds the budget, every document is truncated by the
/// same ratio so one very long document cannot starve the others.
pub fn assemble_context(documents: &[String], budget_chars: usize) -> String {
    let total: usize = documents.iter().map(|d| d.chars().count()).sum();
    if total <= budget_chars {
        return documents.join("\n\n---\n\n");
    }

    let ratio = budget_chars as f64 / total as f64;
    debug!(total, budget_chars, "Context over budget, truncating proportionally");
    let truncated: Vec<String> = documents
        .iter()
        .map(|d| {
            let keep = (d.chars().count() as f64 * ratio).floor() as usize;
            d.chars().take(keep).collect()
        })
        .collect();
    truncated.join("\n\n---\n\n")
}

/// Deduplicate cited sources by path, preserving first-seen order.
pub fn dedup_sources(sources: Vec<SourceRef>) -> Vec<SourceRef> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|s| seen.insert(s.path.clone()))
        .collect()
}
