//! Completion provider abstraction.
//!
//! The engine only ever talks to an LLM through [`CompletionProvider`];
//! concrete backends (GLM over the OpenAI-compatible API) live in the
//! infra crate.

pub mod provider;

pub use provider::CompletionProvider;
