//! Token accounting for backends that report no usage figures

use tiktoken_rs::o200k_base;

use crate::types::{ChoiceMessage, Message, Usage};

/// Estimate usage for a finished completion
///
/// The backend reports no token counts, so both sides are estimated from
/// the text that actually crossed the wire: the compiled prompt messages
/// and the assembled assistant message (content or serialized tool
/// calls).
#[must_use]
pub fn estimate(prompt_messages: &[Message], completion: &ChoiceMessage) -> Usage {
    let prompt_tokens: usize = prompt_messages
        .iter()
        .map(|m| count_tokens(&m.content.as_text()))
        .sum();

    let completion_text = completion.content.clone().unwrap_or_else(|| {
        completion
            .tool_calls
            .as_ref()
            .map(|calls| serde_json::json!({ "tool_calls": calls }).to_string())
            .unwrap_or_default()
    });
    let completion_tokens = count_tokens(&completion_text);

    let prompt_tokens = u32::try_from(prompt_tokens).unwrap_or(u32::MAX);
    let completion_tokens = u32::try_from(completion_tokens).unwrap_or(u32::MAX);

    Usage {
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens.saturating_add(completion_tokens),
    }
}

/// Count tokens with tiktoken, falling back to a bytes/4 heuristic
fn count_tokens(text: &str) -> usize {
    o200k_base().map_or_else(|_| text.len() / 4, |bpe| bpe.encode_with_special_tokens(text).len())
}
