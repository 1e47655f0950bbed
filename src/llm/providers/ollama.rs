//! Ollama provider adapter
//!
//! Ollama's plain generate endpoint has no native tool calling, so this
//! adapter honors the ProviderAdapter contract by prompt rendering and
//! marker parsing: tool declarations and the running history are folded into
//! a single prompt, the model is instructed to emit a fenced ```tool block
//! containing a JSON call object when it wants to invoke a tool, and that
//! marker is parsed back into a ToolCall. Absence of the marker — or any
//! malformed or partial marker — is treated as a final content reply, since
//! the backend cannot be forced to comply.

use crate::config::ProviderConfig;
use crate::error::{Result, SqlPilotError};
use crate::llm::client::LlmHttpClient;
use crate::llm::message::{Message, MessageRole, ProviderReply, ToolCall, ToolDeclaration};
use crate::llm::provider::{sanitize_content, ProviderAdapter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Fence tag the model is instructed to use for tool invocations
const TOOL_FENCE: &str = "```tool";

/// Ollama adapter
pub struct OllamaAdapter {
    base_url: String,
    model: String,
    client: LlmHttpClient,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaAdapter {
    /// Create a new Ollama adapter from provider configuration
    pub fn new(config: &ProviderConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client: LlmHttpClient::with_timeout(timeout_secs)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for OllamaAdapter {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDeclaration],
    ) -> Result<ProviderReply> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: render_prompt(messages, tools),
            stream: false,
            options: GenerateOptions {
                temperature: 0.1,
                num_predict: 4096,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let body = self
            .client
            .post_json(self.name(), &url, LlmHttpClient::json_headers(), &request)
            .await?;

        let response: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            SqlPilotError::provider_unavailable(
                self.name(),
                format!("unparseable response: {}", e),
            )
        })?;

        debug!(model = %self.model, "ollama turn completed");
        Ok(parse_reply(&response.response))
    }

    async fn probe(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.base_url);
        self.client
            .get_text(self.name(), &url, LlmHttpClient::json_headers())
            .await?;
        Ok(())
    }
}

/// Render tool declarations plus the running history into a single prompt.
pub fn render_prompt(messages: &[Message], tools: &[ToolDeclaration]) -> String {
    let mut prompt = String::new();

    for message in messages {
        match message.role {
            MessageRole::System => {
                if let Some(content) = &message.content {
                    prompt.push_str(content);
                    prompt.push_str("\n\n");
                }
            }
            _ => {}
        }
    }

    if !tools.is_empty() {
        prompt.push_str("## Available tools\n");
        for tool in tools {
            prompt.push_str(&format!(
                "- {}: {}\n  parameters: {}\n",
                tool.name, tool.description, tool.parameters
            ));
        }
        prompt.push_str(
            "\nTo call a tool, reply with ONLY a fenced block of the form:\n\
             ```tool\n{\"name\": \"<tool name>\", \"arguments\": {<parameters>}}\n```\n\
             One tool call per reply. When you have gathered enough schema \
             information, reply with the final SQL statement instead, with no \
             fenced block.\n\n",
        );
    }

    prompt.push_str("## Conversation so far\n");
    for message in messages {
        match message.role {
            MessageRole::System => {}
            MessageRole::User => {
                if let Some(content) = &message.content {
                    prompt.push_str(&format!("User: {}\n", content));
                }
            }
            MessageRole::Assistant => {
                if message.tool_calls.is_empty() {
                    if let Some(content) = &message.content {
                        prompt.push_str(&format!("Assistant: {}\n", content));
                    }
                } else {
                    for call in &message.tool_calls {
                        prompt.push_str(&format!(
                            "Assistant called tool {} with arguments {}\n",
                            call.name,
                            Value::Object(call.arguments.clone())
                        ));
                    }
                }
            }
            MessageRole::Tool => {
                if let Some(content) = &message.content {
                    prompt.push_str(&format!("Tool result: {}\n", content));
                }
            }
        }
    }
    prompt.push_str("\nAssistant:");
    prompt
}

/// Parse a raw model reply into a normalized [`ProviderReply`].
///
/// Grammar: a fenced block opened by ```` ```tool ````, a JSON object with a
/// string `name` and an optional object `arguments`, closed by ```` ``` ````.
/// Everything that fails this grammar — missing closing fence, truncated
/// JSON, non-object payload, missing name — falls back to a final text
/// reply.
pub fn parse_reply(raw: &str) -> ProviderReply {
    let cleaned = sanitize_content(raw);

    let Some(start) = cleaned.find(TOOL_FENCE) else {
        return ProviderReply::Content(cleaned);
    };

    let after_tag = &cleaned[start + TOOL_FENCE.len()..];
    let Some(end) = after_tag.find("```") else {
        // partial marker: the payload was cut off mid-stream
        return ProviderReply::Content(cleaned);
    };
    let payload = after_tag[..end].trim();

    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(payload) else {
        return ProviderReply::Content(cleaned);
    };
    let Some(name) = object.get("name").and_then(Value::as_str) else {
        return ProviderReply::Content(cleaned);
    };
    let arguments = match object.get("arguments") {
        Some(Value::Object(map)) => map.clone(),
        None | Some(Value::Null) => serde_json::Map::new(),
        // arguments present but not an object: not a well-formed call
        Some(_) => return ProviderReply::Content(cleaned),
    };

    ProviderReply::ToolCalls(vec![ToolCall::new(
        uuid::Uuid::new_v4().to_string(),
        name,
        arguments,
    )])
}
