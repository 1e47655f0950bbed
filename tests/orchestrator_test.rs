//! End-to-end orchestration tests
//!
//! Drive real questions through the full stack (orchestrator, tool registry,
//! gateway, in-memory SQLite) with a scripted provider standing in for the
//! model. The scripted adapter replays raw text through the marker parser,
//! so these tests exercise the same fallback path a backend without native
//! tool calling uses. The adapter also checks the tool-call/tool-result
//! pairing invariant on every turn it receives.

use async_trait::async_trait;
use sqlpilot::agent::Orchestrator;
use sqlpilot::database::{DatabaseGateway, DatabasePool};
use sqlpilot::error::{Result, SqlPilotError};
use sqlpilot::llm::message::{Conversation, Message, ProviderReply, ToolDeclaration};
use sqlpilot::llm::provider::ProviderAdapter;
use sqlpilot::llm::providers::ollama::parse_reply;
use sqlpilot::llm::ProviderSelector;
use sqlpilot::tools::database_tools;
use std::sync::Arc;
use std::sync::Mutex;

/// Replays raw text replies through the marker parser, like a backend
/// without native tool calling would produce them.
struct ScriptedTextAdapter {
    replies: Mutex<Vec<String>>,
}

impl ScriptedTextAdapter {
    fn new(replies: &[&str]) -> Self {
        let mut replies: Vec<String> = replies.iter().map(|r| r.to_string()).collect();
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
        }
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedTextAdapter {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        messages: &[Message],
        _tools: &[ToolDeclaration],
    ) -> Result<ProviderReply> {
        // every history the orchestrator sends must satisfy the pairing
        // invariant
        let mut conversation = Conversation::new();
        for message in messages {
            conversation.push(message.clone());
        }
        assert!(
            conversation.verify_tool_pairing(),
            "orchestrator sent an unpaired history"
        );

        let raw = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| SqlPilotError::provider_unavailable("scripted", "script exhausted"))?;
        Ok(parse_reply(&raw))
    }

    async fn probe(&self) -> Result<()> {
        Ok(())
    }
}

async fn seeded_gateway() -> Arc<DatabaseGateway> {
    let pool = DatabasePool::from_url("sqlite::memory:").await.unwrap();
    match &pool {
        DatabasePool::Sqlite(p) => {
            sqlx::query(
                "CREATE TABLE users (\
                     id INTEGER PRIMARY KEY, \
                     user_name TEXT NOT NULL, \
                     email TEXT, \
                     signup_date TEXT)",
            )
            .execute(p)
            .await
            .unwrap();
            sqlx::query(
                "INSERT INTO users (user_name, email, signup_date) VALUES \
                 ('kim', 'kim@example.com', '2024-01-05'), \
                 ('lee', 'lee@example.com', '2024-02-11'), \
                 ('park', NULL, '2024-03-20')",
            )
            .execute(p)
            .await
            .unwrap();
            sqlx::query("CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER)")
                .execute(p)
                .await
                .unwrap();
        }
        _ => unreachable!(),
    }
    Arc::new(DatabaseGateway::new(pool, 5))
}

async fn orchestrator_with(replies: &[&str]) -> Orchestrator {
    let gateway = seeded_gateway().await;
    let registry = Arc::new(database_tools(Arc::clone(&gateway)).unwrap());
    let selector = Arc::new(
        ProviderSelector::new(vec![(
            "scripted".to_string(),
            Arc::new(ScriptedTextAdapter::new(replies)) as Arc<dyn ProviderAdapter>,
        )])
        .unwrap(),
    );
    Orchestrator::new(selector, registry, gateway, 5)
}

#[tokio::test]
async fn marker_fallback_answers_korean_question() {
    let orchestrator = orchestrator_with(&[
        "```tool\n{\"name\": \"list_tables\", \"arguments\": {}}\n```",
        "```tool\n{\"name\": \"table_schema\", \"arguments\": {\"table_name\": \"users\"}}\n```",
        "<think>the users table has what I need</think>\n\
         ```sql\nSELECT user_name, email FROM users ORDER BY id;\n```",
    ])
    .await;

    let answer = orchestrator
        .answer_question("사용자 테이블의 모든 데이터를 보여줘")
        .await
        .unwrap();

    assert_eq!(answer.sql, "SELECT user_name, email FROM users ORDER BY id;");
    assert_eq!(answer.result.columns, vec!["user_name", "email"]);
    assert_eq!(answer.result.rows.len(), 3);
    assert_eq!(answer.result.rows[0]["user_name"], "kim");
    assert_eq!(answer.result.rows[2]["email"], serde_json::Value::Null);
}

#[tokio::test]
async fn schema_error_is_reported_and_model_recovers() {
    let orchestrator = orchestrator_with(&[
        "```tool\n{\"name\": \"table_schema\", \"arguments\": {\"table_name\": \"customers\"}}\n```",
        "```tool\n{\"name\": \"list_tables\", \"arguments\": {}}\n```",
        "SELECT user_name FROM users;",
    ])
    .await;

    let answer = orchestrator
        .answer_question("show me the customers")
        .await
        .unwrap();
    assert_eq!(answer.result.rows.len(), 3);
}

#[tokio::test]
async fn multi_statement_reply_is_rejected() {
    let orchestrator =
        orchestrator_with(&["SELECT user_name FROM users; DROP TABLE users;"]).await;

    let result = orchestrator.answer_question("show then drop").await;
    assert!(matches!(result, Err(SqlPilotError::UnsafeQuery(_))));
}

#[tokio::test]
async fn truncated_marker_is_ambiguous_not_executed() {
    // a cut-off tool marker falls back to content, which is not SQL
    let orchestrator =
        orchestrator_with(&["```tool\n{\"name\": \"table_schema\", \"argum"]).await;

    let result = orchestrator.answer_question("anything").await;
    assert!(matches!(result, Err(SqlPilotError::AmbiguousQuestion(_))));
}

#[tokio::test]
async fn iteration_cap_aborts_endless_tool_use() {
    let call = "```tool\n{\"name\": \"list_tables\", \"arguments\": {}}\n```";
    let orchestrator = orchestrator_with(&[call, call, call, call, call, call]).await;

    let result = orchestrator.answer_question("never stop").await;
    assert!(matches!(result, Err(SqlPilotError::TooManyIterations(5))));
}

#[tokio::test]
async fn select_star_preserves_column_order() {
    let gateway = seeded_gateway().await;
    let result = gateway.execute("select * from users").await.unwrap();
    assert_eq!(
        result.columns,
        vec!["id", "user_name", "email", "signup_date"]
    );
    assert_eq!(result.rows.len(), 3);
}

#[tokio::test]
async fn selector_rejects_unknown_provider() {
    let selector = ProviderSelector::new(vec![(
        "scripted".to_string(),
        Arc::new(ScriptedTextAdapter::new(&[])) as Arc<dyn ProviderAdapter>,
    )])
    .unwrap();

    let result = selector.switch("groq").await;
    assert!(matches!(result, Err(SqlPilotError::UnknownProvider(_))));
    assert_eq!(selector.current().await.name(), "scripted");
}
