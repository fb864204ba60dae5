//! Conversion between internal types and the `OpenAI` wire format

use crate::protocol::openai::{
    OpenAiChoice, OpenAiChoiceMessage, OpenAiContent, OpenAiContentPart, OpenAiFunctionCall, OpenAiMessage,
    OpenAiRequest, OpenAiResponse, OpenAiStreamChoice, OpenAiStreamChunk, OpenAiStreamDelta, OpenAiStreamToolCall,
    OpenAiToolCall, OpenAiUsage,
};
use crate::types::{
    CompletionParams, CompletionRequest, Content, ContentPart, FunctionCall, FunctionDefinition, Message, Role,
    StreamDelta, ToolCall, ToolChoice, ToolChoiceFunction, ToolChoiceMode, ToolDefinition,
};

// -- Inbound: OpenAI wire format -> internal types --

impl From<OpenAiRequest> for CompletionRequest {
    fn from(req: OpenAiRequest) -> Self {
        Self {
            model: req.model,
            messages: req.messages.into_iter().map(Into::into).collect(),
            params: CompletionParams {
                temperature: req.temperature,
                top_p: req.top_p,
                max_tokens: req.max_tokens,
                stop: req.stop,
            },
            tools: req.tools.map(|tools| {
                tools
                    .into_iter()
                    .map(|t| ToolDefinition {
                        tool_type: t.tool_type,
                        function: FunctionDefinition {
                            name: t.function.name,
                            description: t.function.description,
                            parameters: t.function.parameters,
                        },
                    })
                    .collect()
            }),
            tool_choice: req.tool_choice.and_then(|v| parse_tool_choice(&v)),
            stream: req.stream.unwrap_or(false),
        }
    }
}

impl From<OpenAiMessage> for Message {
    fn from(msg: OpenAiMessage) -> Self {
        let role = match msg.role.as_str() {
            "system" => Role::System,
            "assistant" => Role::Assistant,
            "tool" => Role::Tool,
            _ => Role::User,
        };

        let content = match msg.content {
            Some(OpenAiContent::Text(text)) => Content::Text(text),
            Some(OpenAiContent::Parts(parts)) => Content::Parts(
                parts
                    .into_iter()
                    .map(|OpenAiContentPart::Text { text }| ContentPart::Text { text })
                    .collect(),
            ),
            None => Content::Text(String::new()),
        };

        let tool_calls = msg.tool_calls.map(|calls| {
            calls
                .into_iter()
                .map(|tc| ToolCall {
                    id: tc.id,
                    function: FunctionCall {
                        name: tc.function.name,
                        arguments: tc.function.arguments,
                    },
                })
                .collect()
        });

        Self {
            role,
            content,
            tool_calls,
            tool_call_id: msg.tool_call_id,
        }
    }
}

/// Parse `OpenAI`'s flexible `tool_choice` field into the internal type
pub fn parse_tool_choice(value: &serde_json::Value) -> Option<ToolChoice> {
    match value {
        serde_json::Value::String(s) => match s.as_str() {
            "none" => Some(ToolChoice::Mode(ToolChoiceMode::None)),
            "auto" => Some(ToolChoice::Mode(ToolChoiceMode::Auto)),
            "required" => Some(ToolChoice::Mode(ToolChoiceMode::Required)),
            _ => None,
        },
        serde_json::Value::Object(_) => serde_json::from_value::<ToolChoiceFunction>(value.clone())
            .ok()
            .map(ToolChoice::Function),
        _ => None,
    }
}

// -- Outbound: internal types -> OpenAI wire format --

impl From<crate::types::CompletionResponse> for OpenAiResponse {
    fn from(resp: crate::types::CompletionResponse) -> Self {
        Self {
            id: resp.id,
            object: resp.object,
            created: resp.created,
            model: resp.model,
            choices: resp
                .choices
                .into_iter()
                .map(|choice| OpenAiChoice {
                    index: choice.index,
                    message: OpenAiChoiceMessage {
                        role: choice.message.role,
                        content: choice.message.content,
                        tool_calls: choice
                            .message
                            .tool_calls
                            .map(|calls| calls.into_iter().map(Into::into).collect()),
                    },
                    finish_reason: choice.finish_reason.as_str().to_owned(),
                })
                .collect(),
            usage: OpenAiUsage {
                prompt_tokens: resp.usage.prompt_tokens,
                completion_tokens: resp.usage.completion_tokens,
                total_tokens: resp.usage.total_tokens,
            },
        }
    }
}

impl From<ToolCall> for OpenAiToolCall {
    fn from(call: ToolCall) -> Self {
        Self {
            id: call.id,
            tool_type: "function".to_owned(),
            function: OpenAiFunctionCall {
                name: call.function.name,
                arguments: call.function.arguments,
            },
        }
    }
}

/// Convert an internal stream delta to an `OpenAI` stream chunk
pub fn delta_to_chunk(delta: &StreamDelta, id: &str, model: &str, created: u64) -> OpenAiStreamChunk {
    let tool_calls = delta.tool_calls.as_ref().map(|calls| {
        calls
            .iter()
            .enumerate()
            .map(|(index, call)| OpenAiStreamToolCall {
                index: u32::try_from(index).unwrap_or(u32::MAX),
                id: call.id.clone(),
                tool_type: "function".to_owned(),
                function: OpenAiFunctionCall {
                    name: call.function.name.clone(),
                    arguments: call.function.arguments.clone(),
                },
            })
            .collect()
    });

    OpenAiStreamChunk {
        id: id.to_owned(),
        object: "chat.completion.chunk".to_owned(),
        created,
        model: model.to_owned(),
        choices: vec![OpenAiStreamChoice {
            index: 0,
            delta: OpenAiStreamDelta {
                role: delta.role.clone(),
                content: delta.content.clone(),
                tool_calls,
            },
            finish_reason: delta.finish_reason.map(|fr| fr.as_str().to_owned()),
        }],
    }
}
