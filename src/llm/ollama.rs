//! Ollama backend through Rig.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use rig::message::AssistantContent;
use rig::providers::ollama;

use crate::config::LlmConfig;
use crate::conversation::ConversationTurn;

use super::{LanguageModel, LlmError, LlmResult};

/// Ollama chat model.
///
/// Prior turns are rendered into a transcript block ahead of the prompt.
pub struct OllamaChat {
    model: ollama::CompletionModel,
    model_name: String,
    temperature: f64,
}

impl OllamaChat {
    /// Create a chat model from application settings.
    ///
    /// # Errors
    /// Returns an error if the Ollama client cannot be built.
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(rig::client::Nothing);
        let builder = if let Some(base_url) = &config.base_url {
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(LlmError::from)?;
        let model = client.completion_model(config.model.clone());

        Ok(Self {
            model,
            model_name: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaChat {
    async fn complete(&self, history: &[ConversationTurn], prompt: &str) -> LlmResult<String> {
        let request = self
            .model
            .completion_request(render_prompt(history, prompt))
            .temperature(self.temperature)
            .build();

        let response = self.model.completion(request).await?;
        let text = extract_text(&response.choice);
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn render_prompt(history: &[ConversationTurn], prompt: &str) -> String {
    if history.is_empty() {
        return prompt.to_string();
    }

    let mut out = String::from("Conversation so far:\n");
    for turn in history {
        out.push_str(turn.role.as_str());
        out.push_str(": ");
        out.push_str(&turn.content);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(prompt);
    out
}

fn extract_text(choice: &rig::OneOrMany<AssistantContent>) -> String {
    let mut out = String::new();
    for content in choice.iter() {
        if let AssistantContent::Text(text) = content {
            out.push_str(&text.text);
        }
    }
    out
}
