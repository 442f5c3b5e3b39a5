//! Business logic for Studium: the presence/broadcast engine and the
//! chat session service with its bounded-history retention policy.
//!
//! This crate defines the repository and completion-provider traits;
//! concrete implementations live in studium-infra.

pub mod chat;
pub mod llm;
pub mod presence;
