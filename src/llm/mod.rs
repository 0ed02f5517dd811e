//! Language-model capability used by the assistant.
//!
//! The rest of the crate only sees [`LanguageModel`]: prior turns plus a new
//! prompt in, completion text out. Backends:
//! - [`OpenAiChat`]: any OpenAI-compatible `/chat/completions` endpoint.
//! - [`OllamaChat`]: Ollama through Rig.

pub mod error;
pub mod ollama;
pub mod openai;

pub use error::{LlmError, LlmResult};
pub use ollama::OllamaChat;
pub use openai::OpenAiChat;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{LlmBackend, LlmConfig};
use crate::conversation::ConversationTurn;

/// Opaque text-completion capability.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt` as the next user message after `history`.
    ///
    /// # Errors
    /// Returns an error if the backend call fails or yields no text.
    async fn complete(&self, history: &[ConversationTurn], prompt: &str) -> LlmResult<String>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}

/// Build the backend selected by `config`.
///
/// # Errors
/// Returns an error if the backend client cannot be constructed.
pub fn build_language_model(config: &LlmConfig) -> LlmResult<Arc<dyn LanguageModel>> {
    match config.backend {
        LlmBackend::OpenAi => Ok(Arc::new(OpenAiChat::from_config(config)?)),
        LlmBackend::Ollama => Ok(Arc::new(OllamaChat::from_config(config)?)),
    }
}
