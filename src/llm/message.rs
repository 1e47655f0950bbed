//! Conversation data model
//!
//! Messages, tool calls and the append-only Conversation that one
//! orchestration run owns. The tool-call/tool-result pairing invariant is
//! mechanically checkable via [`Conversation::verify_tool_pairing`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (sets behavior/context)
    System,
    /// User message (the question)
    User,
    /// Assistant message (model reply, text or tool requests)
    Assistant,
    /// Tool result message
    Tool,
}

/// A request from the model to invoke a named tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque token unique within the conversation
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Arguments, validated against the tool's declared schema on dispatch
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Declaration of a callable tool, advertised to a provider backend.
///
/// `parameters` follows the JSON-schema-like shape
/// `{type: "object", properties: {...}, required: [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Unique tool name
    pub name: String,
    /// Description the backend uses to decide when to invoke the tool
    pub description: String,
    /// Parameter schema
    pub parameters: Value,
}

/// Normalized output of one provider turn: a final answer or more work.
/// Never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    /// Final text content
    Content(String),
    /// The model requests tool invocations
    ToolCalls(Vec<ToolCall>),
}

/// A turn in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: MessageRole,
    /// Text content; None when the turn is purely a tool request
    pub content: Option<String>,
    /// Tool calls issued by this turn (assistant turns only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Link back to the originating call (tool turns only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create an assistant message carrying final text
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create an assistant message carrying tool requests
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: None,
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Create a tool-result message linked to its originating call
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// Ordered, append-only sequence of messages.
///
/// Owned exclusively by one orchestration run; discarded when a terminal
/// message is reached. Mutation is append-only by construction.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Check the tool-call/tool-result pairing invariant: every tool-role
    /// message must match exactly one unresolved `tool_calls` entry in the
    /// immediately preceding assistant message.
    pub fn verify_tool_pairing(&self) -> bool {
        let mut pending: Vec<String> = Vec::new();

        for message in &self.messages {
            match message.role {
                MessageRole::Assistant => {
                    pending = message.tool_calls.iter().map(|c| c.id.clone()).collect();
                }
                MessageRole::Tool => {
                    let id = match &message.tool_call_id {
                        Some(id) => id,
                        None => return false,
                    };
                    match pending.iter().position(|p| p == id) {
                        Some(pos) => {
                            pending.remove(pos);
                        }
                        None => return false,
                    }
                }
                MessageRole::System | MessageRole::User => {
                    if !pending.is_empty() {
                        return false;
                    }
                }
            }
        }
        true
    }
}
