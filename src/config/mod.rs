//! Configuration module
//!
//! Settings are read from the environment (a `.env` file is honored via the
//! `dotenv` crate, loaded by the binary before `AppConfig::from_env`).

use crate::error::{Result, SqlPilotError};
use std::env;

/// Default timeout for a single provider round-trip, in seconds.
/// The model call is the dominant latency risk and must never block a
/// worker indefinitely.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Default timeout for a single database query, in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Default cap on tool-call iterations per question.
pub const DEFAULT_MAX_TOOL_ITERATIONS: u32 = 5;

/// Settings for one configured LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API key, if the backend requires one
    pub api_key: Option<String>,
    /// Base URL for the backend API
    pub base_url: String,
    /// Model identifier
    pub model: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database connection URL (sqlite://, postgres://, mysql://)
    pub database_url: String,
    /// Name of the default provider ("groq", "ollama", "lmstudio")
    pub default_provider: String,
    /// Groq settings
    pub groq: ProviderConfig,
    /// Ollama settings
    pub ollama: ProviderConfig,
    /// LM Studio settings
    pub lmstudio: ProviderConfig,
    /// Timeout for provider round-trips, in seconds
    pub llm_timeout_secs: u64,
    /// Timeout for database queries, in seconds
    pub query_timeout_secs: u64,
    /// Hard cap on tool-call iterations per question
    pub max_tool_iterations: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `DATABASE_URL` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| SqlPilotError::Config("DATABASE_URL is not set".to_string()))?;

        let default_provider = env_or("AI_PROVIDER", "ollama").to_lowercase();

        let groq = ProviderConfig {
            api_key: env::var("GROQ_API_KEY").ok(),
            base_url: env_or("GROQ_BASE_URL", "https://api.groq.com/openai/v1"),
            model: env_or("GROQ_MODEL", "llama-3.3-70b-versatile"),
        };

        let ollama = ProviderConfig {
            api_key: None,
            base_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            model: env_or("OLLAMA_MODEL", "llama3.1"),
        };

        let lmstudio = ProviderConfig {
            api_key: None,
            base_url: env_or("LMSTUDIO_BASE_URL", "http://localhost:1234/v1"),
            model: env_or("LMSTUDIO_MODEL", "local-model"),
        };

        Ok(Self {
            database_url,
            default_provider,
            groq,
            ollama,
            lmstudio,
            llm_timeout_secs: env_parsed("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?,
            query_timeout_secs: env_parsed("QUERY_TIMEOUT_SECS", DEFAULT_QUERY_TIMEOUT_SECS)?,
            max_tool_iterations: env_parsed("MAX_TOOL_ITERATIONS", DEFAULT_MAX_TOOL_ITERATIONS)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| SqlPilotError::Config(format!("invalid value for {}: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_default() {
        assert_eq!(env_or("SQLPILOT_TEST_UNSET_VAR", "fallback"), "fallback");
    }

    #[test]
    fn test_env_parsed_default() {
        let v: u64 = env_parsed("SQLPILOT_TEST_UNSET_NUM", 42).unwrap();
        assert_eq!(v, 42);
    }

    #[test]
    fn test_env_parsed_invalid() {
        env::set_var("SQLPILOT_TEST_BAD_NUM", "not-a-number");
        let result: Result<u64> = env_parsed("SQLPILOT_TEST_BAD_NUM", 1);
        assert!(result.is_err());
        env::remove_var("SQLPILOT_TEST_BAD_NUM");
    }
}
