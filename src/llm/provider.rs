//! Provider adapter abstraction
//!
//! One adapter per backend family. Backends with native function calling
//! receive tool declarations in a structured request field; backends without
//! it are driven through prompt rendering and marker parsing. Both honor the
//! same contract: a [`ProviderReply`] that is either final content or tool
//! calls, never both, with transport failures normalized to
//! `ProviderUnavailableError`.

use crate::error::Result;
use crate::llm::message::{Message, ProviderReply, ToolDeclaration};
use async_trait::async_trait;

/// Trait for LLM provider adapters
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider name as configured (e.g. "groq", "ollama")
    fn name(&self) -> &str;

    /// Send the message history plus tool declarations and return the
    /// normalized reply.
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDeclaration],
    ) -> Result<ProviderReply>;

    /// Cheap connectivity/capability check; must not mutate any state.
    async fn probe(&self) -> Result<()>;
}

/// Remove `<think>...</think>` reasoning blocks some models interleave with
/// their answer. An unterminated block is dropped to the end of the text.
pub fn strip_think_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Strip a surrounding markdown code fence (```sql ... ``` or ``` ... ```)
/// and return the inner text; text without a fence is returned trimmed.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        // Skip an optional language tag on the fence line
        let body_start = after_fence.find('\n').map(|p| p + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            return body[..end].trim().to_string();
        }
        // Single-line fence: ```select 1```
        if body_start == 0 {
            return after_fence.trim_end_matches('`').trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Strip control characters that break transport, keeping newlines and tabs.
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Full output sanitization applied by adapters before returning content.
pub fn sanitize_content(text: &str) -> String {
    strip_control_chars(&strip_think_blocks(text))
        .trim()
        .to_string()
}
