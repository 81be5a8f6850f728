//! LlmProvider trait definition.

use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends.
///
/// Implementations are constructed explicitly and injected into
/// `ChatService`; there is no process-wide client.
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "deepseek", "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
