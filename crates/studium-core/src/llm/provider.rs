use std::future::Future;

use studium_types::error::CompletionError;
use studium_types::llm::{CompletionRequest, CompletionResponse};

/// A chat-completion backend.
///
/// Implementations perform one request/response exchange; streaming,
/// retries, and timeouts are the caller's concern.
pub trait CompletionProvider: Send + Sync {
    /// Short identifier used in logs ("glm", "stub", ...).
    fn name(&self) -> &str;

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, CompletionError>> + Send;
}
