//! OpenAI-compatible chat-completions wire format
//!
//! Groq and LM Studio both speak this format, including native tool calling:
//! tool declarations travel in the structured `tools` request field and tool
//! requests come back as structured `tool_calls`. This module holds the
//! shared request/response types and the conversions to and from the generic
//! message model.

use crate::llm::message::{Message, MessageRole, ProviderReply, ToolCall, ToolDeclaration};
use crate::llm::provider::sanitize_content;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Chat completions request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

/// Message in wire format
#[derive(Debug, Serialize)]
pub struct WireMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Tool declaration in wire format: `{type: "function", function: {...}}`
#[derive(Debug, Serialize)]
pub struct WireTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: WireFunction,
}

#[derive(Debug, Serialize)]
pub struct WireFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Tool call in wire format; `arguments` is a JSON-encoded string
#[derive(Debug, Serialize, Deserialize)]
pub struct WireToolCall {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub call_type: Option<String>,
    pub function: WireCallFunction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WireCallFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Chat completions response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

/// Convert generic messages into wire format
pub fn to_wire_messages(messages: &[Message]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|msg| WireMessage {
            role: match msg.role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
                MessageRole::Tool => "tool",
            }
            .to_string(),
            content: msg.content.clone(),
            tool_calls: if msg.tool_calls.is_empty() {
                None
            } else {
                Some(
                    msg.tool_calls
                        .iter()
                        .map(|call| WireToolCall {
                            id: Some(call.id.clone()),
                            call_type: Some("function".to_string()),
                            function: WireCallFunction {
                                name: call.name.clone(),
                                arguments: Some(Value::String(
                                    Value::Object(call.arguments.clone()).to_string(),
                                )),
                            },
                        })
                        .collect(),
                )
            },
            tool_call_id: msg.tool_call_id.clone(),
        })
        .collect()
}

/// Convert tool declarations into the structured `tools` field
pub fn to_wire_tools(tools: &[ToolDeclaration]) -> Vec<WireTool> {
    tools
        .iter()
        .map(|tool| WireTool {
            tool_type: "function".to_string(),
            function: WireFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        })
        .collect()
}

/// Normalize a chat response message into a [`ProviderReply`].
///
/// Non-empty `tool_calls` win over content; arguments arriving as a
/// JSON-encoded string are parsed leniently (an unparseable payload becomes
/// an empty argument map rather than a hard error, so a sloppy backend still
/// produces a dispatchable call the registry can reject with a typed error).
pub fn normalize_reply(message: ChatResponseMessage) -> ProviderReply {
    if let Some(calls) = message.tool_calls {
        if !calls.is_empty() {
            let tool_calls = calls
                .into_iter()
                .map(|call| ToolCall {
                    id: call
                        .id
                        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                    name: call.function.name,
                    arguments: parse_arguments(call.function.arguments),
                })
                .collect();
            return ProviderReply::ToolCalls(tool_calls);
        }
    }

    let content = message.content.unwrap_or_default();
    ProviderReply::Content(sanitize_content(&content))
}

/// Parse the `arguments` payload, which may arrive as a JSON object or as a
/// JSON-encoded string.
fn parse_arguments(raw: Option<Value>) -> Map<String, Value> {
    match raw {
        Some(Value::Object(map)) => map,
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(&encoded) {
            Ok(Value::Object(map)) => map,
            _ => {
                warn!("unparseable tool-call arguments, passing empty map");
                Map::new()
            }
        },
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_message_round_trip() {
        let messages = vec![
            Message::assistant_tool_calls(vec![ToolCall::new("c1", "list_tables", Map::new())]),
            Message::tool_result("c1", "[\"users\"]"),
        ];
        let wire = to_wire_messages(&messages);
        assert_eq!(wire[0].role, "assistant");
        assert!(wire[0].tool_calls.is_some());
        assert_eq!(wire[1].role, "tool");
        assert_eq!(wire[1].tool_call_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_normalize_structured_tool_call() {
        let message: ChatResponseMessage = serde_json::from_value(serde_json::json!({
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {
                    "name": "table_schema",
                    "arguments": "{\"table_name\": \"users\"}"
                }
            }]
        }))
        .unwrap();

        match normalize_reply(message) {
            ProviderReply::ToolCalls(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "table_schema");
                assert_eq!(calls[0].arguments["table_name"], "users");
            }
            other => panic!("expected tool calls, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_missing_id_synthesizes_one() {
        let message: ChatResponseMessage = serde_json::from_value(serde_json::json!({
            "tool_calls": [{
                "function": {"name": "list_tables", "arguments": {}}
            }]
        }))
        .unwrap();

        match normalize_reply(message) {
            ProviderReply::ToolCalls(calls) => assert!(!calls[0].id.is_empty()),
            other => panic!("expected tool calls, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_content_reply() {
        let message: ChatResponseMessage = serde_json::from_value(serde_json::json!({
            "content": "```sql\nSELECT 1\n```",
            "tool_calls": []
        }))
        .unwrap();

        match normalize_reply(message) {
            // fences are left for the finalization step; control chars and
            // think blocks are gone
            ProviderReply::Content(content) => assert!(content.contains("SELECT 1")),
            other => panic!("expected content, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_arguments_become_empty_map() {
        let map = parse_arguments(Some(Value::String("{not json".to_string())));
        assert!(map.is_empty());
    }
}
