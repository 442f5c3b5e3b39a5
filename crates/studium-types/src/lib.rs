//! Shared domain types for Studium.
//!
//! This crate holds the types exchanged between the core engine, the
//! infrastructure layer, and the API layer: chat sessions and turns,
//! presence events, LLM request/response shapes, and the error taxonomy.

pub mod chat;
pub mod error;
pub mod llm;
pub mod presence;
