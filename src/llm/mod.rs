//! LLM integration layer
//!
//! Generic message model, the provider adapter trait, concrete adapters for
//! each supported backend, and the selector that tracks which provider is
//! active.

pub mod client;
pub mod message;
pub mod provider;
pub mod providers;
pub mod selector;

pub use message::{
    Conversation, Message, MessageRole, ProviderReply, ToolCall, ToolDeclaration,
};
pub use provider::ProviderAdapter;
pub use selector::ProviderSelector;
