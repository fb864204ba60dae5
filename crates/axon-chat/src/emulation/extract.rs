//! Recovers tool calls from raw backend text
//!
//! Backends prompted into the tool-call contract produce anything from
//! clean JSON to prose-wrapped or mid-stream-truncated fragments. Both
//! entry points here are total: any string input yields a value, never a
//! panic or error.

use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use serde_json::Value;

use crate::types::{FunctionCall, ToolCall};

/// Matches a bare `"name": "..."` pair in unparseable text
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""name"\s*:\s*"([A-Za-z0-9_\-]+)""#).expect("must be valid regex"));

/// Matches an `"arguments"` value in either string or object form
static ARGUMENTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""arguments"\s*:\s*(\{[^{}]*\}|"(?:[^"\\]|\\.)*")"#).expect("must be valid regex")
});

/// Whether the text signals a tool call
///
/// True when the text parses as JSON carrying a non-empty `tool_calls`
/// array, or when it merely contains `"tool_calls"` followed by an
/// opening bracket — the shape a truncated mid-stream reply leaves
/// behind. An explicitly empty array is not a signal.
#[must_use]
pub fn detect_tool_calls(text: &str) -> bool {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        return value
            .get("tool_calls")
            .and_then(Value::as_array)
            .is_some_and(|calls| !calls.is_empty());
    }

    let Some(marker) = text.find("\"tool_calls\"") else {
        return false;
    };

    let rest = &text[marker + "\"tool_calls\"".len()..];
    let mut chars = rest.chars().skip_while(|c| c.is_whitespace() || *c == ':');
    if chars.next() != Some('[') {
        return false;
    }

    // `[` then `]` is an empty array, not a call; `[` at end of text is a
    // truncation and counts as a signal
    !matches!(chars.find(|c| !c.is_whitespace()), Some(']'))
}

/// Extract tool calls from raw backend text
///
/// Strict parsing first: a JSON object with a `tool_calls` array yields
/// every well-formed entry, normalized (ids synthesized when missing,
/// arguments always a JSON-encoded string). When the text does not parse
/// at all, a narrow pattern match recovers at most one `name` +
/// `arguments` pair. Anything else yields an empty list.
#[must_use]
pub fn extract_tool_calls(text: &str) -> Vec<ToolCall> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => value
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(|calls| {
                let mut seen = std::collections::HashSet::new();
                calls
                    .iter()
                    .enumerate()
                    .filter_map(|(index, entry)| normalize_entry(entry, index))
                    .map(|mut call| {
                        // Ids must be unique within one response; backends
                        // occasionally repeat them
                        if !seen.insert(call.id.clone()) {
                            call.id = synthetic_call_id(seen.len());
                            seen.insert(call.id.clone());
                        }
                        call
                    })
                    .collect()
            })
            .unwrap_or_default(),
        Err(_) => extract_from_fragment(text),
    }
}

/// Normalize one entry of a parsed `tool_calls` array
///
/// Accepts both the nested `{"function": {"name", "arguments"}}` shape
/// and the flat `{"name", "arguments"}` shape some backends produce.
/// Entries without a usable name are dropped whole rather than emitted
/// half-filled.
fn normalize_entry(entry: &Value, index: usize) -> Option<ToolCall> {
    let function = entry.get("function").unwrap_or(entry);
    let name = function.get("name")?.as_str()?.to_owned();

    let arguments = match function.get("arguments") {
        Some(Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => "{}".to_owned(),
    };

    let id = entry
        .get("id")
        .and_then(Value::as_str)
        .map_or_else(|| synthetic_call_id(index), str::to_owned);

    Some(ToolCall {
        id,
        function: FunctionCall { name, arguments },
    })
}

/// Last-resort extraction of a single call from unparseable text
fn extract_from_fragment(text: &str) -> Vec<ToolCall> {
    let Some(name) = NAME_RE.captures(text).map(|c| c[1].to_owned()) else {
        return Vec::new();
    };

    let arguments = ARGUMENTS_RE
        .captures(text)
        .map_or_else(|| "{}".to_owned(), |c| normalize_fragment_arguments(&c[1]));

    vec![ToolCall {
        id: synthetic_call_id(0),
        function: FunctionCall { name, arguments },
    }]
}

/// Arguments captured from a fragment may be a JSON string literal or a
/// bare object; both normalize to a JSON-encoded object string
fn normalize_fragment_arguments(captured: &str) -> String {
    if captured.starts_with('"') {
        serde_json::from_str::<String>(captured).unwrap_or_else(|_| "{}".to_owned())
    } else {
        captured.to_owned()
    }
}

/// Synthesize an id for a call the backend did not label
pub(crate) fn synthetic_call_id(index: usize) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("call_{millis}_{index}")
}
