//! Groq provider adapter
//!
//! Native tool calling over Groq's OpenAI-compatible chat completions API.

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

/// Groq API adapter
pub struct GroqAdapter {
    api_key: String,
    base_url: String,
    model: String,
    client: LlmHttpClient,
}

impl GroqAdapter {
    /// Create a new Groq adapter from provider configuration
    pub fn new(config: &ProviderConfig, timeout_secs: u64) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| SqlPilotError::Config("GROQ_API_KEY is not set".to_string()))?;
        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client: LlmHttpClient::with_timeout(timeout_secs)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for GroqAdapter {
    fn name(&self) -> &str {
        "groq"
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
        let headers = LlmHttpClient::bearer_headers(&self.api_key)?;
        let body = self
            .client
            .post_json(self.name(), &url, headers, &request)
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

        debug!(model = %self.model, "groq turn completed");
        Ok(normalize_reply(message))
    }

    async fn probe(&self) -> Result<()> {
        let url = format!("{}/models", self.base_url);
        let headers = LlmHttpClient::bearer_headers(&self.api_key)?;
        self.client.get_text(self.name(), &url, headers).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: key.map(|k| k.to_string()),
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
        }
    }

    #[test]
    fn test_adapter_requires_api_key() {
        assert!(GroqAdapter::new(&config(None), 30).is_err());
    }

    #[test]
    fn test_adapter_trims_trailing_slash() {
        let adapter = GroqAdapter::new(&config(Some("k")), 30).unwrap();
        assert_eq!(adapter.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(adapter.name(), "groq");
    }
}
