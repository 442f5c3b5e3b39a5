//! Completion provider implementations.

pub mod glm;

pub use glm::GlmProvider;
