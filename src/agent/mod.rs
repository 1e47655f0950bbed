//! Agent module
//!
//! The orchestration loop that turns a natural-language question into an
//! executed SQL query, plus the system prompt that steers it.

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{Orchestrator, QueryAnswer};
pub use prompt::REFUSAL_SENTENCE;
