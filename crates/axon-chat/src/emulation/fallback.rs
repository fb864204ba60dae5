//! Synthesizes a tool call when a mandatory tool choice went unanswered
//!
//! Engaged only when the effective tool choice is `required` or names a
//! specific function and extraction recovered nothing — including when
//! the backend returned empty text or the backend call itself failed.
//! The synthesized call keeps the response contract intact: mandatory
//! choices always yield at least one call.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::extract::synthetic_call_id;
use crate::types::{FunctionCall, ToolCall, ToolChoice, ToolDefinition};

/// First binary arithmetic operation in a sentence, e.g. `15 * 8`
static EXPRESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?\s*[-+*/%]\s*\d+(?:\.\d+)?").expect("must be valid regex"));

/// A quoted phrase
static QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("must be valid regex"));

/// Trailing place name after a preposition, e.g. `in San Francisco`
static PLACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:in|for|at|near)\s+([A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*)").expect("must be valid regex"));

/// Keyword groups used to match user wording against tool purposes
const TIME_WORDS: &[&str] = &["time", "date", "clock", "today", "now", "hour"];
const MATH_WORDS: &[&str] = &["calculate", "compute", "sum", "plus", "minus", "multiply", "divide", "times", "math"];
const PLACE_WORDS: &[&str] = &["weather", "temperature", "forecast", "rain", "sunny", "city", "location", "where"];

/// Synthesize a tool call satisfying the given mandatory choice
///
/// Returns `None` only when no tools were declared, which request
/// validation rules out for mandatory choices.
#[must_use]
pub fn synthesize_tool_call(
    tools: &[ToolDefinition],
    tool_choice: &ToolChoice,
    user_text: Option<&str>,
) -> Option<ToolCall> {
    let target = match tool_choice.mandated_function() {
        Some(name) => tools.iter().find(|t| t.function.name == name)?,
        None => select_tool(tools, user_text.unwrap_or_default())?,
    };

    let arguments = synthesize_arguments(target, user_text.unwrap_or_default());

    Some(ToolCall {
        id: synthetic_call_id(0),
        function: FunctionCall {
            name: target.function.name.clone(),
            arguments,
        },
    })
}

/// Pick the declared tool that best matches the user's wording
///
/// Each tool is scored by keyword overlap between the message and the
/// tool's name and description; ties and zero scores fall back to the
/// first declared tool.
fn select_tool<'a>(tools: &'a [ToolDefinition], user_text: &str) -> Option<&'a ToolDefinition> {
    let first = tools.first()?;
    let message = user_text.to_lowercase();

    let mut best = (first, 0_usize);
    for tool in tools {
        let score = score_tool(tool, &message);
        if score > best.1 {
            best = (tool, score);
        }
    }

    tracing::debug!(tool = %best.0.function.name, score = best.1, "fallback selected tool");
    Some(best.0)
}

fn score_tool(tool: &ToolDefinition, message: &str) -> usize {
    let haystack = format!(
        "{} {}",
        tool.function.name.to_lowercase(),
        tool.function.description.as_deref().unwrap_or_default().to_lowercase()
    );

    // Direct overlap: message words appearing in the tool's name/description
    let mut score = message
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() > 2 && haystack.contains(word))
        .count();

    // Domain affinity: wording categories mapped to tool vocabulary
    for (words, markers) in [
        (TIME_WORDS, &["time", "date", "clock"][..]),
        (MATH_WORDS, &["calc", "math", "arith"][..]),
        (PLACE_WORDS, &["weather", "location", "geo", "forecast"][..]),
    ] {
        let wording_matches = words.iter().any(|w| message.contains(w));
        let tool_matches = markers.iter().any(|m| haystack.contains(m));
        if wording_matches && tool_matches {
            score += 3;
        }
    }

    // Arithmetic in the message strongly suggests a calculation tool
    if EXPRESSION_RE.is_match(message) && ["calc", "math", "arith"].iter().any(|m| haystack.contains(m)) {
        score += 3;
    }

    score
}

/// Build a JSON arguments string for the selected tool
///
/// Each declared parameter is offered to the strategy chain in turn;
/// parameters no strategy can fill are omitted. No match at all yields
/// `{}`.
fn synthesize_arguments(tool: &ToolDefinition, user_text: &str) -> String {
    let strategies: &[&dyn ArgumentStrategy] = &[&ExpressionStrategy, &LocationStrategy];

    let mut arguments = serde_json::Map::new();

    if let Some(properties) = tool
        .function
        .parameters
        .as_ref()
        .and_then(|schema| schema.get("properties"))
        .and_then(Value::as_object)
    {
        for (name, spec) in properties {
            if let Some(value) = strategies
                .iter()
                .find(|s| s.applies(name, spec))
                .and_then(|s| s.extract(user_text))
            {
                arguments.insert(name.clone(), value);
            }
        }
    }

    Value::Object(arguments).to_string()
}

/// One heuristic for filling a single parameter from user text
///
/// Strategies are consulted in declaration order; the first whose
/// `applies` accepts the parameter gets to extract a value. New
/// heuristics slot in without touching synthesis control flow.
trait ArgumentStrategy: Sync {
    /// Whether this strategy can fill the given parameter
    fn applies(&self, name: &str, spec: &Value) -> bool;

    /// Pull a value out of the user's message
    fn extract(&self, user_text: &str) -> Option<Value>;
}

/// Fills expression-like parameters with the first arithmetic
/// sub-expression of the message
struct ExpressionStrategy;

impl ArgumentStrategy for ExpressionStrategy {
    fn applies(&self, name: &str, _spec: &Value) -> bool {
        let name = name.to_lowercase();
        ["expression", "formula", "equation", "query"]
            .iter()
            .any(|marker| name.contains(marker))
    }

    fn extract(&self, user_text: &str) -> Option<Value> {
        EXPRESSION_RE
            .find(user_text)
            .map(|m| Value::String(m.as_str().to_owned()))
    }
}

/// Fills location-like parameters with a quoted phrase or a trailing
/// capitalized place name
struct LocationStrategy;

impl ArgumentStrategy for LocationStrategy {
    fn applies(&self, name: &str, _spec: &Value) -> bool {
        let name = name.to_lowercase();
        ["location", "city", "place", "region"]
            .iter()
            .any(|marker| name.contains(marker))
    }

    fn extract(&self, user_text: &str) -> Option<Value> {
        if let Some(captures) = QUOTED_RE.captures(user_text) {
            let quoted = captures.get(1).or_else(|| captures.get(2))?;
            return Some(Value::String(quoted.as_str().to_owned()));
        }

        PLACE_RE
            .captures(user_text)
            .map(|captures| Value::String(captures[1].trim().to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{FunctionDefinition, ToolChoiceFunction, ToolChoiceFunctionName, ToolChoiceMode};

    fn tool(name: &str, description: &str, parameters: Value) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_owned(),
            function: FunctionDefinition {
                name: name.to_owned(),
                description: Some(description.to_owned()),
                parameters: Some(parameters),
            },
        }
    }

    fn calculate_tool() -> ToolDefinition {
        tool(
            "calculate",
            "Evaluate an arithmetic expression",
            json!({
                "type": "object",
                "properties": { "expression": { "type": "string" } },
                "required": ["expression"]
            }),
        )
    }

    fn weather_tool() -> ToolDefinition {
        tool(
            "get_weather",
            "Get the weather forecast for a location",
            json!({
                "type": "object",
                "properties": { "location": { "type": "string" } },
                "required": ["location"]
            }),
        )
    }

    fn time_tool() -> ToolDefinition {
        tool("get_current_time", "Get the current time", json!({ "type": "object", "properties": {} }))
    }

    #[test]
    fn arithmetic_scenario_picks_first_subexpression() {
        let call = synthesize_tool_call(
            &[calculate_tool()],
            &ToolChoice::Mode(ToolChoiceMode::Required),
            Some("Calculate 15 * 8 + 42"),
        )
        .unwrap();

        assert_eq!(call.function.name, "calculate");
        let arguments: Value = serde_json::from_str(&call.function.arguments).unwrap();
        assert_eq!(arguments, json!({ "expression": "15 * 8" }));
    }

    #[test]
    fn required_choice_scores_tools_by_wording() {
        let tools = [time_tool(), calculate_tool(), weather_tool()];

        let weather = synthesize_tool_call(
            &tools,
            &ToolChoice::Mode(ToolChoiceMode::Required),
            Some("What's the weather in Paris?"),
        )
        .unwrap();
        assert_eq!(weather.function.name, "get_weather");

        let time = synthesize_tool_call(
            &tools,
            &ToolChoice::Mode(ToolChoiceMode::Required),
            Some("what time is it now"),
        )
        .unwrap();
        assert_eq!(time.function.name, "get_current_time");
    }

    #[test]
    fn no_match_defaults_to_first_declared_tool() {
        let tools = [time_tool(), weather_tool()];
        let call = synthesize_tool_call(
            &tools,
            &ToolChoice::Mode(ToolChoiceMode::Required),
            Some("tell me something interesting"),
        )
        .unwrap();
        assert_eq!(call.function.name, "get_current_time");
    }

    #[test]
    fn empty_user_text_defaults_to_empty_arguments() {
        let call = synthesize_tool_call(&[weather_tool()], &ToolChoice::Mode(ToolChoiceMode::Required), None).unwrap();
        assert_eq!(call.function.arguments, "{}");
    }

    #[test]
    fn specific_choice_targets_the_named_tool() {
        let choice = ToolChoice::Function(ToolChoiceFunction {
            tool_type: "function".to_owned(),
            function: ToolChoiceFunctionName {
                name: "get_weather".to_owned(),
            },
        });
        let call = synthesize_tool_call(
            &[calculate_tool(), weather_tool()],
            &choice,
            Some("How warm is it in New York today?"),
        )
        .unwrap();

        assert_eq!(call.function.name, "get_weather");
        let arguments: Value = serde_json::from_str(&call.function.arguments).unwrap();
        assert_eq!(arguments, json!({ "location": "New York" }));
    }

    #[test]
    fn quoted_location_wins_over_trailing_phrase() {
        let call = synthesize_tool_call(
            &[weather_tool()],
            &ToolChoice::Mode(ToolChoiceMode::Required),
            Some(r#"forecast for "Rio de Janeiro" please"#),
        )
        .unwrap();
        let arguments: Value = serde_json::from_str(&call.function.arguments).unwrap();
        assert_eq!(arguments["location"], "Rio de Janeiro");
    }

    #[test]
    fn no_declared_tools_yields_none() {
        assert!(synthesize_tool_call(&[], &ToolChoice::Mode(ToolChoiceMode::Required), Some("hi")).is_none());
    }

    #[test]
    fn synthesized_ids_carry_the_call_prefix() {
        let call = synthesize_tool_call(
            &[calculate_tool()],
            &ToolChoice::Mode(ToolChoiceMode::Required),
            Some("2 + 2"),
        )
        .unwrap();
        assert!(call.id.starts_with("call_"));
    }
}
