//! Orchestration loop
//!
//! Drives one natural-language question to a terminal outcome: seed the
//! conversation, hand it to the active provider, dispatch any tool calls the
//! model requests, and repeat until the model produces final content or the
//! iteration cap trips. The final content is then cleaned, screened for the
//! refusal sentence, and executed through the gateway.

use crate::agent::prompt::{system_prompt, REFUSAL_SENTENCE};
use crate::database::{DatabaseGateway, QueryResult};
use crate::error::{Result, SqlPilotError};
use crate::llm::message::{Conversation, Message, ProviderReply, ToolCall};
use crate::llm::provider::strip_code_fences;
use crate::llm::ProviderSelector;
use crate::tools::ToolRegistry;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Phase of one orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    /// Conversation seeded, no provider turn taken yet
    Seeded,
    /// A provider turn is in flight
    AwaitingProvider,
    /// The provider requested tools; they are being dispatched
    ExecutingTools,
}

/// Terminal outcome of a successful run
#[derive(Debug, Clone)]
pub struct QueryAnswer {
    /// The SQL the model produced, post-cleanup
    pub sql: String,
    /// Execution result
    pub result: QueryResult,
}

/// Orchestrator
///
/// One instance serves many questions; each call to
/// [`answer_question`](Self::answer_question) owns a fresh conversation and
/// pins the provider that was active when it started.
pub struct Orchestrator {
    selector: Arc<ProviderSelector>,
    registry: Arc<ToolRegistry>,
    gateway: Arc<DatabaseGateway>,
    max_tool_iterations: u32,
}

impl Orchestrator {
    /// Create an orchestrator over the given provider selector, tool
    /// registry and gateway
    pub fn new(
        selector: Arc<ProviderSelector>,
        registry: Arc<ToolRegistry>,
        gateway: Arc<DatabaseGateway>,
        max_tool_iterations: u32,
    ) -> Self {
        Self {
            selector,
            registry,
            gateway,
            max_tool_iterations,
        }
    }

    /// Answer one natural-language question.
    ///
    /// The provider is snapshotted up front so a concurrent switch cannot
    /// change backends mid-conversation. Tool failures are reported back to
    /// the model as tool results; only provider transport failures, the
    /// iteration cap and finalization failures abort the run.
    pub async fn answer_question(&self, question: &str) -> Result<QueryAnswer> {
        let started = std::time::Instant::now();
        let provider = self.selector.current().await;
        let declarations = self.registry.declarations();

        let mut conversation = Conversation::new();
        conversation.push(Message::system(system_prompt(self.gateway.backend())));
        conversation.push(Message::user(question));
        let mut state = LoopState::Seeded;

        info!(provider = provider.name(), state = ?state, "question accepted");

        for iteration in 0..self.max_tool_iterations {
            state = LoopState::AwaitingProvider;
            debug!(iteration, state = ?state, "requesting provider turn");

            let reply = provider
                .chat(conversation.messages(), &declarations)
                .await?;

            match reply {
                ProviderReply::Content(content) => {
                    debug!(
                        iteration,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "provider produced final content"
                    );
                    return self.finalize(&content).await;
                }
                ProviderReply::ToolCalls(calls) => {
                    state = LoopState::ExecutingTools;
                    debug!(iteration, count = calls.len(), state = ?state, "dispatching tool calls");
                    conversation.push(Message::assistant_tool_calls(calls.clone()));
                    for call in &calls {
                        let result = self.dispatch(call).await;
                        conversation.push(Message::tool_result(&call.id, result));
                    }
                }
            }
        }

        warn!(
            cap = self.max_tool_iterations,
            "iteration cap reached without final content"
        );
        Err(SqlPilotError::TooManyIterations(self.max_tool_iterations))
    }

    /// Run one tool call and serialize its outcome for the model.
    ///
    /// Errors become structured JSON tool results rather than aborting the
    /// conversation, so the model can correct itself on the next turn.
    async fn dispatch(&self, call: &ToolCall) -> String {
        match self.registry.invoke(&call.name, &call.arguments).await {
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!(tool = %call.name, kind = e.kind(), "tool call failed: {}", e);
                json!({
                    "error": {
                        "kind": e.kind(),
                        "message": e.to_string(),
                    }
                })
                .to_string()
            }
        }
    }

    /// Clean final content, screen out refusals and non-SQL replies, and
    /// execute the query
    async fn finalize(&self, content: &str) -> Result<QueryAnswer> {
        let sql = strip_code_fences(content).trim().to_string();

        if sql.contains(REFUSAL_SENTENCE) {
            return Err(SqlPilotError::AmbiguousQuestion(sql));
        }
        // prose, apologies, partial tool markers: anything without a SELECT
        // is the model failing to answer, not an unsafe query
        if !sql.to_lowercase().contains("select") {
            return Err(SqlPilotError::AmbiguousQuestion(sql));
        }

        info!(sql = %sql, "executing generated query");
        let result = self.gateway.execute(&sql).await?;
        Ok(QueryAnswer { sql, result })
    }
}
