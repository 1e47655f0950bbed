//! Tool registry
//!
//! Named tools the model may invoke during orchestration. Registration is
//! append-only and name-keyed; dispatch validates arguments against the
//! declared parameter schema before the handler runs, so handlers can assume
//! well-typed input. Every failure mode carries its own error kind, which the
//! orchestrator serializes back to the model as a tool result instead of
//! aborting the conversation.

use crate::database::DatabaseGateway;
use crate::error::{Result, SqlPilotError};
use crate::llm::message::ToolDeclaration;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Executable body of a tool
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool. Arguments have already been validated against the
    /// declared parameters.
    async fn call(&self, arguments: &Map<String, Value>) -> Result<Value>;
}

/// Declared parameter of a tool
#[derive(Debug, Clone)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Description surfaced to the model
    pub description: String,
    /// JSON type name (`string`, `integer`, ...)
    pub param_type: String,
    /// Whether dispatch rejects calls that omit this parameter
    pub required: bool,
}

impl ToolParameter {
    /// A required string parameter
    pub fn required_string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: "string".to_string(),
            required: true,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self.param_type.as_str() {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        }
    }
}

/// A registered tool: declaration plus handler
pub struct Tool {
    name: String,
    description: String,
    parameters: Vec<ToolParameter>,
    handler: Arc<dyn ToolHandler>,
}

impl Tool {
    /// Create a tool from its declaration pieces and handler
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ToolParameter>,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }

    /// Tool name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build the declaration advertised to provider backends
    pub fn declaration(&self) -> ToolDeclaration {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.param_type,
                    "description": param.description,
                }),
            );
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }
        ToolDeclaration {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }

    fn validate(&self, arguments: &Map<String, Value>) -> Result<()> {
        for param in &self.parameters {
            match arguments.get(&param.name) {
                Some(value) => {
                    if !param.matches(value) {
                        return Err(SqlPilotError::InvalidArguments {
                            tool: self.name.clone(),
                            reason: format!(
                                "parameter '{}' must be of type {}",
                                param.name, param.param_type
                            ),
                        });
                    }
                }
                None if param.required => {
                    return Err(SqlPilotError::InvalidArguments {
                        tool: self.name.clone(),
                        reason: format!("missing required parameter '{}'", param.name),
                    });
                }
                None => {}
            }
        }
        for key in arguments.keys() {
            if !self.parameters.iter().any(|p| &p.name == key) {
                return Err(SqlPilotError::InvalidArguments {
                    tool: self.name.clone(),
                    reason: format!("unexpected parameter '{}'", key),
                });
            }
        }
        Ok(())
    }
}

/// Name-keyed collection of tools, kept in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names are unique; a second registration under the
    /// same name is rejected.
    pub fn register(&mut self, tool: Tool) -> Result<()> {
        if self.tools.iter().any(|t| t.name == tool.name) {
            return Err(SqlPilotError::DuplicateTool(tool.name));
        }
        debug!(tool = %tool.name, "tool registered");
        self.tools.push(tool);
        Ok(())
    }

    /// Declarations of every registered tool, in registration order
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools.iter().map(Tool::declaration).collect()
    }

    /// Dispatch a call to a named tool.
    ///
    /// Unknown names and invalid arguments are rejected before the handler
    /// runs; handler failures are wrapped so the caller can tell a dispatch
    /// problem from an execution problem.
    pub async fn invoke(&self, name: &str, arguments: &Map<String, Value>) -> Result<Value> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SqlPilotError::UnknownTool(name.to_string()))?;

        tool.validate(arguments)?;
        tool.handler
            .call(arguments)
            .await
            .map_err(|e| SqlPilotError::tool_execution(name, e))
    }
}

struct ListTablesTool {
    gateway: Arc<DatabaseGateway>,
}

#[async_trait]
impl ToolHandler for ListTablesTool {
    async fn call(&self, _arguments: &Map<String, Value>) -> Result<Value> {
        let tables = self.gateway.list_tables().await?;
        Ok(json!(tables))
    }
}

struct TableSchemaTool {
    gateway: Arc<DatabaseGateway>,
}

#[async_trait]
impl ToolHandler for TableSchemaTool {
    async fn call(&self, arguments: &Map<String, Value>) -> Result<Value> {
        let table_name = arguments
            .get("table_name")
            .and_then(Value::as_str)
            .ok_or_else(|| SqlPilotError::InvalidArguments {
                tool: "table_schema".to_string(),
                reason: "missing required parameter 'table_name'".to_string(),
            })?;
        let schema = self.gateway.table_schema(table_name).await?;
        Ok(serde_json::to_value(schema)?)
    }
}

/// Build a registry carrying the two schema-discovery tools bound to the
/// given gateway. Descriptions steer the model to list tables first, inspect
/// each relevant schema next, and only then write SQL.
pub fn database_tools(gateway: Arc<DatabaseGateway>) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Tool::new(
        "list_tables",
        "List the names of all tables in the connected database. \
         Always call this first to learn what data is available.",
        Vec::new(),
        Arc::new(ListTablesTool {
            gateway: Arc::clone(&gateway),
        }),
    ))?;
    registry.register(Tool::new(
        "table_schema",
        "Get the full schema of one table: columns, types, nullability, \
         primary keys and comments. Call this for every table your SQL will \
         reference before writing the final query.",
        vec![ToolParameter::required_string(
            "table_name",
            "Exact name of the table to inspect, as returned by list_tables",
        )],
        Arc::new(TableSchemaTool { gateway }),
    ))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabasePool;

    struct EchoTool;

    #[async_trait]
    impl ToolHandler for EchoTool {
        async fn call(&self, arguments: &Map<String, Value>) -> Result<Value> {
            Ok(Value::Object(arguments.clone()))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl ToolHandler for FailingTool {
        async fn call(&self, _arguments: &Map<String, Value>) -> Result<Value> {
            Err(SqlPilotError::TableNotFound("ghosts".to_string()))
        }
    }

    fn echo_tool(name: &str) -> Tool {
        Tool::new(
            name,
            "echoes its arguments",
            vec![ToolParameter::required_string("text", "text to echo")],
            Arc::new(EchoTool),
        )
    }

    fn args(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo")).unwrap();
        let result = registry.register(echo_tool("echo"));
        assert!(matches!(result, Err(SqlPilotError::DuplicateTool(_))));
    }

    #[test]
    fn test_declarations_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("b")).unwrap();
        registry.register(echo_tool("a")).unwrap();
        let names: Vec<String> = registry
            .declarations()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_declaration_schema_shape() {
        let decl = echo_tool("echo").declaration();
        assert_eq!(decl.parameters["type"], "object");
        assert_eq!(decl.parameters["properties"]["text"]["type"], "string");
        assert_eq!(decl.parameters["required"][0], "text");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let result = registry.invoke("nope", &Map::new()).await;
        assert!(matches!(result, Err(SqlPilotError::UnknownTool(_))));
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo")).unwrap();
        let result = registry.invoke("echo", &Map::new()).await;
        assert!(matches!(
            result,
            Err(SqlPilotError::InvalidArguments { .. })
        ));
    }

    #[tokio::test]
    async fn test_wrong_argument_type() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo")).unwrap();
        let result = registry.invoke("echo", &args(&[("text", json!(42))])).await;
        assert!(matches!(
            result,
            Err(SqlPilotError::InvalidArguments { .. })
        ));
    }

    #[tokio::test]
    async fn test_unexpected_argument() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo")).unwrap();
        let result = registry
            .invoke(
                "echo",
                &args(&[("text", json!("hi")), ("extra", json!("nope"))]),
            )
            .await;
        assert!(matches!(
            result,
            Err(SqlPilotError::InvalidArguments { .. })
        ));
    }

    #[tokio::test]
    async fn test_successful_invoke() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo")).unwrap();
        let value = registry
            .invoke("echo", &args(&[("text", json!("hi"))]))
            .await
            .unwrap();
        assert_eq!(value["text"], "hi");
    }

    #[tokio::test]
    async fn test_handler_error_is_wrapped() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Tool::new(
                "fail",
                "always fails",
                Vec::new(),
                Arc::new(FailingTool),
            ))
            .unwrap();
        match registry.invoke("fail", &Map::new()).await {
            Err(SqlPilotError::ToolExecution { tool, source }) => {
                assert_eq!(tool, "fail");
                assert!(matches!(*source, SqlPilotError::TableNotFound(_)));
            }
            other => panic!("expected wrapped execution error, got {:?}", other),
        }
    }

    async fn seeded_registry() -> ToolRegistry {
        let pool = DatabasePool::from_url("sqlite::memory:").await.unwrap();
        match &pool {
            DatabasePool::Sqlite(p) => {
                sqlx::query("CREATE TABLE users (id INTEGER PRIMARY KEY, user_name TEXT NOT NULL)")
                    .execute(p)
                    .await
                    .unwrap();
            }
            _ => unreachable!(),
        }
        database_tools(Arc::new(DatabaseGateway::new(pool, 5))).unwrap()
    }

    #[tokio::test]
    async fn test_database_tools_list_and_schema() {
        let registry = seeded_registry().await;

        let tables = registry.invoke("list_tables", &Map::new()).await.unwrap();
        assert_eq!(tables, json!(["users"]));

        let schema = registry
            .invoke("table_schema", &args(&[("table_name", json!("users"))]))
            .await
            .unwrap();
        assert_eq!(schema["table"], "users");
        assert_eq!(schema["columns"][0]["name"], "id");
        assert_eq!(schema["columns"][0]["is_primary_key"], true);
    }

    #[tokio::test]
    async fn test_database_tools_missing_table() {
        let registry = seeded_registry().await;
        match registry
            .invoke("table_schema", &args(&[("table_name", json!("ghosts"))]))
            .await
        {
            Err(SqlPilotError::ToolExecution { source, .. }) => {
                assert!(matches!(*source, SqlPilotError::TableNotFound(_)));
            }
            other => panic!("expected table-not-found, got {:?}", other),
        }
    }
}
