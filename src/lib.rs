//! SqlPilot Library
//!
//! Turns natural-language questions into executed SQL: an LLM discovers the
//! database schema through callable tools, emits a single SELECT, and the
//! gateway runs it under a safety guard. The main binary is in src/main.rs.

pub mod agent;
pub mod config;
pub mod database;
pub mod error;
pub mod llm;
pub mod tools;
