//! Structural validation of inbound completion requests
//!
//! Violations surface to the caller as client errors; nothing here is
//! silently repaired.

use serde_json::Value;

use crate::error::ChatError;
use crate::types::{CompletionRequest, Role};

/// Validate a request before any backend work happens
///
/// # Errors
///
/// Returns `ChatError::InvalidRequest` describing the first violation
/// found.
pub fn validate_request(request: &CompletionRequest) -> Result<(), ChatError> {
    if request.messages.is_empty() {
        return Err(invalid("messages must not be empty"));
    }

    for (index, message) in request.messages.iter().enumerate() {
        if message.role == Role::Tool && message.tool_call_id.as_deref().unwrap_or_default().is_empty() {
            return Err(invalid(format!(
                "messages[{index}]: tool messages must carry a tool_call_id"
            )));
        }
    }

    let tools = request.tool_slice();
    for (index, tool) in tools.iter().enumerate() {
        if tool.tool_type != "function" {
            return Err(invalid(format!(
                "tools[{index}]: unsupported tool type '{}'",
                tool.tool_type
            )));
        }
        if tool.function.name.is_empty() {
            return Err(invalid(format!("tools[{index}]: function name must not be empty")));
        }
        if let Some(parameters) = &tool.function.parameters {
            let is_object_schema =
                parameters.is_object() && parameters.get("type").and_then(Value::as_str) == Some("object");
            if !is_object_schema {
                return Err(invalid(format!(
                    "tools[{index}]: parameters must be a JSON schema with type \"object\""
                )));
            }
        }
    }

    if let Some(choice) = &request.tool_choice {
        if tools.is_empty() && !choice.forbids_calls() {
            return Err(invalid("tool_choice requires at least one tool definition"));
        }
        if let Some(name) = choice.mandated_function()
            && !tools.iter().any(|t| t.function.name == name)
        {
            return Err(invalid(format!("tool_choice names unknown function '{name}'")));
        }
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ChatError {
    ChatError::InvalidRequest(message.into())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{
        CompletionParams, FunctionDefinition, Message, ToolChoice, ToolChoiceFunction, ToolChoiceFunctionName,
        ToolChoiceMode, ToolDefinition,
    };

    fn request(messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            model: "m".to_owned(),
            messages,
            params: CompletionParams::default(),
            tools: None,
            tool_choice: None,
            stream: false,
        }
    }

    fn tool(name: &str, parameters: Option<serde_json::Value>) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_owned(),
            function: FunctionDefinition {
                name: name.to_owned(),
                description: None,
                parameters,
            },
        }
    }

    #[test]
    fn tool_message_without_call_id_is_rejected() {
        let mut req = request(vec![Message::text(Role::Tool, "result")]);
        assert!(validate_request(&req).is_err());

        req.messages[0].tool_call_id = Some("call_1".to_owned());
        validate_request(&req).unwrap();
    }

    #[test]
    fn non_object_parameter_schema_is_rejected() {
        let mut req = request(vec![Message::text(Role::User, "hi")]);
        req.tools = Some(vec![tool("f", Some(json!({ "type": "array" })))]);
        assert!(validate_request(&req).is_err());

        req.tools = Some(vec![tool("f", Some(json!({ "type": "object", "properties": {} })))]);
        validate_request(&req).unwrap();
    }

    #[test]
    fn tool_choice_without_tools_is_rejected() {
        let mut req = request(vec![Message::text(Role::User, "hi")]);
        req.tool_choice = Some(ToolChoice::Mode(ToolChoiceMode::Required));
        assert!(validate_request(&req).is_err());

        // "none" without tools is harmless
        req.tool_choice = Some(ToolChoice::Mode(ToolChoiceMode::None));
        validate_request(&req).unwrap();
    }

    #[test]
    fn tool_choice_naming_unknown_function_is_rejected() {
        let mut req = request(vec![Message::text(Role::User, "hi")]);
        req.tools = Some(vec![tool("known", None)]);
        req.tool_choice = Some(ToolChoice::Function(ToolChoiceFunction {
            tool_type: "function".to_owned(),
            function: ToolChoiceFunctionName {
                name: "unknown".to_owned(),
            },
        }));
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn empty_message_list_is_rejected() {
        assert!(validate_request(&request(Vec::new())).is_err());
    }
}
