//! LM Studio provider adapter
//!
//! A locally hosted OpenAI-compatible server with native tool calling.
//! Unlike Groq there is no API key; the base URL points at the local
//! instance (default `http://localhost:1234/v1`).

use crate::config::ProviderConfig;
use crate::error::{Result, SqlPilotError};
use crate::llm::client::LlmHttpClient;
use crate::llm::message::{Message, ProviderReply, ToolDeclaration};
use crate::llm::provider::ProviderAdapter;
use crate::llm::providers::openai_compat::{
    normalize_reply, to_wire_messages, to_wire_tools, ChatRequest, ChatResponse,
};
use async_trait::async_trait;
use tracing::debug;

/// LM Studio adapter
pub struct LmStudioAdapter {
    base_url: String,
    model: String,
    client: LlmHttpClient,
}

impl LmStudioAdapter {
    /// Create a new LM Studio adapter from provider configuration
    pub fn new(config: &ProviderConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client: LlmHttpClient::with_timeout(timeout_secs)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for LmStudioAdapter {
    fn name(&self) -> &str {
        "lmstudio"
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDeclaration],
    ) -> Result<ProviderReply> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: to_wire_messages(messages),
            tools: if tools.is_empty() {
                None
            } else {
                Some(to_wire_tools(tools))
            },
            tool_choice: if tools.is_empty() {
                None
            } else {
                Some("auto".to_string())
            },
            max_tokens: Some(4096),
            temperature: Some(0.1),
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let body = self
            .client
            .post_json(self.name(), &url, LlmHttpClient::json_headers(), &request)
            .await?;

        let response: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            SqlPilotError::provider_unavailable(
                self.name(),
                format!("unparseable response: {}", e),
            )
        })?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                SqlPilotError::provider_unavailable(self.name(), "response carried no choices")
            })?;

        debug!(model = %self.model, "lmstudio turn completed");
        Ok(normalize_reply(message))
    }

    async fn probe(&self) -> Result<()> {
        let url = format!("{}/models", self.base_url);
        self.client
            .get_text(self.name(), &url, LlmHttpClient::json_headers())
            .await?;
        Ok(())
    }
}
