//! Error types for language-model backends.

use thiserror::Error;

/// Language-model call failure.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure talking to the backend.
    #[error("llm request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Backend answered with a non-success status.
    #[error("llm returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
    /// Backend answered without any completion text.
    #[error("llm response carried no completion text")]
    EmptyResponse,
    /// Backend is not configured.
    #[error("llm configuration error: {0}")]
    Config(String),
    /// Rig HTTP client construction error.
    #[error("llm client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// Rig completion error.
    #[error("completion error: {0}")]
    Completion(#[from] rig::completion::CompletionError),
}

/// Convenience result alias for language-model calls.
pub type LlmResult<T> = Result<T, LlmError>;
