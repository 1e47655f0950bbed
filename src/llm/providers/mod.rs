//! Concrete provider adapters
//!
//! Groq and LM Studio speak the OpenAI-compatible chat completions format
//! with native tool calling (shared wire types live in `openai_compat`);
//! Ollama has no native tool calling and works through prompt rendering and
//! marker parsing instead.

pub mod groq;
pub mod lmstudio;
pub mod ollama;
pub mod openai_compat;

pub use groq::GroqAdapter;
pub use lmstudio::LmStudioAdapter;
pub use ollama::OllamaAdapter;
