//! Infrastructure implementations for Studium.
//!
//! Everything that touches the outside world lives here: the SQLite
//! persistence layer behind `studium_core::chat::ChatRepository`, the GLM
//! completion provider behind `studium_core::llm::CompletionProvider`, and
//! environment-driven configuration.

pub mod config;
pub mod llm;
pub mod sqlite;
