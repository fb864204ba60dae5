//! Compiles tool definitions into backend instructions

use serde_json::Value;

use crate::types::{Content, Message, Role, ToolChoice, ToolDefinition};

/// The exact reply shape the backend is told to produce for a call
const CALL_FORMAT: &str = r#"{"tool_calls": [{"id": "call_1", "type": "function", "function": {"name": "<function name>", "arguments": "{\"<param>\": \"<value>\"}"}}]}"#;

/// Render the system prompt that teaches the backend to emit tool calls
#[must_use]
pub fn tool_system_prompt(tools: &[ToolDefinition], tool_choice: Option<&ToolChoice>) -> String {
    let mut prompt = String::from("You have access to the following functions:\n");

    for tool in tools {
        prompt.push_str("\n- ");
        prompt.push_str(&tool.function.name);
        if let Some(description) = &tool.function.description {
            prompt.push_str(": ");
            prompt.push_str(description);
        }
        prompt.push('\n');

        for line in parameter_lines(tool.function.parameters.as_ref()) {
            prompt.push_str("    ");
            prompt.push_str(&line);
            prompt.push('\n');
        }
    }

    prompt.push_str("\nTo call a function, respond with ONLY a JSON object of this exact shape:\n");
    prompt.push_str(CALL_FORMAT);
    prompt.push_str("\nDo not wrap the JSON in code fences or add any other text around it.\n");

    match tool_choice {
        Some(choice) if choice.forbids_calls() => {
            prompt.push_str("\nDo NOT call any functions.\n");
        }
        Some(choice) => {
            if let Some(name) = choice.mandated_function() {
                prompt.push_str(&format!("\nYou MUST call the function \"{name}\".\n"));
            } else if choice.is_mandatory() {
                prompt.push_str("\nYou MUST call at least one function.\n");
            }
        }
        None => {}
    }

    prompt
}

/// Render `name (type, required|optional)` lines from a parameter schema
fn parameter_lines(parameters: Option<&Value>) -> Vec<String> {
    let Some(schema) = parameters else {
        return Vec::new();
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| {
            properties
                .iter()
                .map(|(name, spec)| {
                    let param_type = spec.get("type").and_then(Value::as_str).unwrap_or("any");
                    let requirement = if required.contains(&name.as_str()) {
                        "required"
                    } else {
                        "optional"
                    };
                    format!("- {name} ({param_type}, {requirement})")
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Rewrite the message list for a tool-less backend
///
/// Inserts the compiled tool instructions as a system message (merging
/// into an existing leading system message when present) and flattens
/// tool-call traffic into plain text the backend can follow:
/// assistant-side calls become their JSON rendering, tool results become
/// user-visible text tagged with the call id.
#[must_use]
pub fn compile_messages(
    messages: &[Message],
    tools: &[ToolDefinition],
    tool_choice: Option<&ToolChoice>,
) -> Vec<Message> {
    let mut compiled: Vec<Message> = messages.iter().map(flatten_message).collect();

    if tools.is_empty() {
        return compiled;
    }

    let instructions = tool_system_prompt(tools, tool_choice);
    match compiled.first_mut() {
        Some(first) if first.role == Role::System => {
            let merged = format!("{}\n\n{instructions}", first.content.as_text());
            first.content = Content::Text(merged);
        }
        _ => compiled.insert(0, Message::text(Role::System, instructions)),
    }

    compiled
}

/// Flatten a single message into plain text the backend understands
fn flatten_message(message: &Message) -> Message {
    match message.role {
        Role::Assistant if message.tool_calls.is_some() => {
            let rendered = serde_json::json!({ "tool_calls": message.tool_calls }).to_string();
            Message::text(Role::Assistant, rendered)
        }
        Role::Tool => {
            let call_id = message.tool_call_id.as_deref().unwrap_or_default();
            let body = message.content.as_text();
            Message::text(Role::User, format!("[Result of tool call {call_id}]\n{body}"))
        }
        _ => Message::text(message.role, message.content.as_text()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{FunctionDefinition, ToolChoiceFunction, ToolChoiceFunctionName, ToolChoiceMode};

    fn weather_tool() -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_owned(),
            function: FunctionDefinition {
                name: "get_weather".to_owned(),
                description: Some("Get the current weather".to_owned()),
                parameters: Some(json!({
                    "type": "object",
                    "properties": {
                        "location": { "type": "string" },
                        "unit": { "type": "string" }
                    },
                    "required": ["location"]
                })),
            },
        }
    }

    #[test]
    fn prompt_lists_parameters_with_requirement() {
        let prompt = tool_system_prompt(&[weather_tool()], None);
        assert!(prompt.contains("get_weather: Get the current weather"));
        assert!(prompt.contains("- location (string, required)"));
        assert!(prompt.contains("- unit (string, optional)"));
        assert!(prompt.contains(r#""tool_calls""#));
    }

    #[test]
    fn required_choice_adds_directive() {
        let prompt = tool_system_prompt(&[weather_tool()], Some(&ToolChoice::Mode(ToolChoiceMode::Required)));
        assert!(prompt.contains("MUST call at least one function"));
    }

    #[test]
    fn none_choice_forbids_calls() {
        let prompt = tool_system_prompt(&[weather_tool()], Some(&ToolChoice::Mode(ToolChoiceMode::None)));
        assert!(prompt.contains("Do NOT call any functions"));
    }

    #[test]
    fn specific_choice_names_the_function() {
        let choice = ToolChoice::Function(ToolChoiceFunction {
            tool_type: "function".to_owned(),
            function: ToolChoiceFunctionName {
                name: "get_weather".to_owned(),
            },
        });
        let prompt = tool_system_prompt(&[weather_tool()], Some(&choice));
        assert!(prompt.contains(r#"MUST call the function "get_weather""#));
    }

    #[test]
    fn auto_choice_adds_no_directive() {
        let prompt = tool_system_prompt(&[weather_tool()], Some(&ToolChoice::Mode(ToolChoiceMode::Auto)));
        assert!(!prompt.contains("MUST"));
        assert!(!prompt.contains("Do NOT call"));
    }

    #[test]
    fn instructions_merge_into_existing_system_message() {
        let messages = vec![
            Message::text(Role::System, "You are terse."),
            Message::text(Role::User, "hi"),
        ];
        let compiled = compile_messages(&messages, &[weather_tool()], None);
        assert_eq!(compiled.len(), 2);
        assert_eq!(compiled[0].role, Role::System);
        let system_text = compiled[0].content.as_text();
        assert!(system_text.starts_with("You are terse."));
        assert!(system_text.contains("get_weather"));
    }

    #[test]
    fn tool_results_become_tagged_user_text() {
        let mut tool_message = Message::text(Role::Tool, "sunny, 22C");
        tool_message.tool_call_id = Some("call_9".to_owned());

        let compiled = compile_messages(&[tool_message], &[weather_tool()], None);
        // Index 0 is the injected system prompt
        assert_eq!(compiled[1].role, Role::User);
        let text = compiled[1].content.as_text();
        assert!(text.contains("call_9"));
        assert!(text.contains("sunny, 22C"));
    }

    #[test]
    fn without_tools_messages_pass_through() {
        let messages = vec![Message::text(Role::User, "hi")];
        let compiled = compile_messages(&messages, &[], None);
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].content.as_text(), "hi");
    }
}
