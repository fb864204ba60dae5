use serde::{Deserialize, Serialize};

use super::message::ToolCall;
use super::response::FinishReason;

/// Event emitted while streaming a response
///
/// The backend produces complete text, so these events are synthesized by
/// re-chunking the finished response rather than relayed from upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StreamEvent {
    /// Incremental content delta
    Delta(StreamDelta),
    /// Stream has completed (rendered as the `[DONE]` sentinel)
    Done,
}

/// Incremental update within a streaming response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamDelta {
    /// Role marker (present on the first chunk only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Incremental text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls (emitted whole in a single chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Reason generation finished (present on the final delta)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}
