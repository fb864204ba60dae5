//! Shapes extracted results into OpenAI-form responses
//!
//! The backend hands over complete text, so streaming here means
//! re-chunking a finished response into a synthetic delta sequence whose
//! concatenation reproduces the non-streaming content exactly.

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::types::{Choice, ChoiceMessage, CompletionResponse, FinishReason, StreamDelta, StreamEvent, ToolCall, Usage};

/// Target size of one synthetic content chunk
const CHUNK_CHARS: usize = 24;

/// Decide the assistant message and finish reason from extraction output
///
/// Tool calls win over text; the `tool_calls` field is non-empty or
/// absent, never an empty array. Truncation maps to `length` only for
/// plain text replies.
#[must_use]
pub fn assemble_message(text: String, tool_calls: Vec<ToolCall>, truncated: bool) -> (ChoiceMessage, FinishReason) {
    if tool_calls.is_empty() {
        let finish = if truncated { FinishReason::Length } else { FinishReason::Stop };
        (ChoiceMessage::text(text), finish)
    } else {
        (ChoiceMessage::with_tool_calls(tool_calls), FinishReason::ToolCalls)
    }
}

/// Build the final completion response envelope
#[must_use]
pub fn completion_response(model: &str, message: ChoiceMessage, finish_reason: FinishReason, usage: Usage) -> CompletionResponse {
    CompletionResponse {
        id: format!("chatcmpl-{}", Uuid::new_v4()),
        object: "chat.completion".to_owned(),
        created: unix_now(),
        model: model.to_owned(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason,
        }],
        usage,
    }
}

/// Re-chunk a finished message into the synthetic delta sequence
///
/// Order is fixed: a role-only delta, then content fragments (or the
/// full `tool_calls` array in a single delta), then an empty delta
/// carrying the finish reason, then `Done`.
#[must_use]
pub fn stream_events(message: &ChoiceMessage, finish_reason: FinishReason) -> Vec<StreamEvent> {
    let mut events = vec![StreamEvent::Delta(StreamDelta {
        role: Some("assistant".to_owned()),
        ..Default::default()
    })];

    if let Some(tool_calls) = &message.tool_calls {
        events.push(StreamEvent::Delta(StreamDelta {
            tool_calls: Some(tool_calls.clone()),
            ..Default::default()
        }));
    } else if let Some(content) = &message.content {
        for fragment in rechunk(content) {
            events.push(StreamEvent::Delta(StreamDelta {
                content: Some(fragment),
                ..Default::default()
            }));
        }
    }

    events.push(StreamEvent::Delta(StreamDelta {
        finish_reason: Some(finish_reason),
        ..Default::default()
    }));
    events.push(StreamEvent::Done);

    events
}

/// Split text into fragments that concatenate back to the original
///
/// Breaks after whitespace once a fragment passes the target size, so
/// words stay whole and no character is dropped or duplicated.
fn rechunk(text: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();

    for piece in text.split_inclusive(char::is_whitespace) {
        current.push_str(piece);
        if current.len() >= CHUNK_CHARS {
            fragments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        fragments.push(current);
    }

    fragments
}

/// Current unix timestamp in seconds
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
