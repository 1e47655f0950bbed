//! Error types for sqlpilot
//!
//! A single error enum covers the whole pipeline: tool dispatch, query
//! execution, provider transport, and orchestration. Tool-level variants are
//! serialized back into the conversation so the model can correct itself;
//! provider- and orchestration-level variants terminate the question.

use thiserror::Error;

/// Result type alias for sqlpilot
pub type Result<T> = std::result::Result<T, SqlPilotError>;

/// Main error type for sqlpilot
#[derive(Error, Debug)]
pub enum SqlPilotError {
    /// A tool was registered twice under the same name
    #[error("duplicate tool: {0}")]
    DuplicateTool(String),

    /// The model requested a tool that is not registered
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments did not satisfy the declared parameter schema
    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// A tool handler failed while executing
    #[error("tool '{tool}' failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: Box<SqlPilotError>,
    },

    /// The requested table does not exist
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The statement is not a single read-only SELECT
    #[error("unsafe query rejected: {0}")]
    UnsafeQuery(String),

    /// The backend reported a SQL error
    #[error("query execution failed: {0}")]
    QueryExecution(String),

    /// The query exceeded its time budget
    #[error("query timed out after {0} seconds")]
    QueryTimeout(u64),

    /// The provider backend could not be reached or replied abnormally
    #[error("provider '{provider}' unavailable: {message}")]
    ProviderUnavailable { provider: String, message: String },

    /// The named provider is not configured
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The model never converged within the iteration cap
    #[error("too many tool iterations (limit {0})")]
    TooManyIterations(u32),

    /// The model declared the question unintelligible
    #[error("ambiguous question: {0}")]
    AmbiguousQuestion(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SqlPilotError {
    /// Stable machine-readable kind, reported alongside the human message in
    /// every terminal outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlPilotError::DuplicateTool(_) => "duplicate_tool",
            SqlPilotError::UnknownTool(_) => "unknown_tool",
            SqlPilotError::InvalidArguments { .. } => "invalid_arguments",
            SqlPilotError::ToolExecution { .. } => "tool_execution",
            SqlPilotError::TableNotFound(_) => "table_not_found",
            SqlPilotError::UnsafeQuery(_) => "unsafe_query",
            SqlPilotError::QueryExecution(_) => "query_execution",
            SqlPilotError::QueryTimeout(_) => "query_timeout",
            SqlPilotError::ProviderUnavailable { .. } => "provider_unavailable",
            SqlPilotError::UnknownProvider(_) => "unknown_provider",
            SqlPilotError::TooManyIterations(_) => "too_many_iterations",
            SqlPilotError::AmbiguousQuestion(_) => "ambiguous_question",
            SqlPilotError::Config(_) => "config",
            SqlPilotError::Io(_) => "io",
            SqlPilotError::Serialization(_) => "serialization",
        }
    }

    /// Wrap a gateway or handler failure as a tool execution error,
    /// preserving the original cause.
    pub fn tool_execution(tool: impl Into<String>, source: SqlPilotError) -> Self {
        SqlPilotError::ToolExecution {
            tool: tool.into(),
            source: Box::new(source),
        }
    }

    /// Build a provider-unavailable error from any transport failure.
    pub fn provider_unavailable(
        provider: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SqlPilotError::ProviderUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(SqlPilotError::UnknownTool("x".into()).kind(), "unknown_tool");
        assert_eq!(
            SqlPilotError::UnsafeQuery("DROP".into()).kind(),
            "unsafe_query"
        );
        assert_eq!(SqlPilotError::QueryTimeout(30).kind(), "query_timeout");
        assert_eq!(
            SqlPilotError::provider_unavailable("groq", "connect refused").kind(),
            "provider_unavailable"
        );
    }

    #[test]
    fn test_tool_execution_preserves_cause() {
        let err = SqlPilotError::tool_execution(
            "table_schema",
            SqlPilotError::TableNotFound("ghosts".into()),
        );
        assert_eq!(err.kind(), "tool_execution");
        assert!(err.to_string().contains("table_schema"));
        assert!(err.to_string().contains("ghosts"));
    }
}
