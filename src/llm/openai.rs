//! OpenAI-compatible chat-completions backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::conversation::ConversationTurn;

use super::{LanguageModel, LlmError, LlmResult};

/// Chat-completions client speaking the OpenAI wire format.
pub struct OpenAiChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiChat {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`).
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
        }
    }

    /// Create a client from application settings.
    ///
    /// # Errors
    /// Returns an error if no API key or base URL is configured.
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::Config("OPENAI_API_KEY is not set".to_string()))?;
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| LlmError::Config("OpenAI base url is not set".to_string()))?;
        Ok(Self::new(api_key, base_url, config.model.clone(), config.temperature))
    }

    /// Prior turns as role-tagged messages, then `prompt` as the user message.
    fn build_request<'a>(
        &'a self,
        history: &'a [ConversationTurn],
        prompt: &'a str,
    ) -> ChatRequest<'a> {
        let mut messages: Vec<ChatMessage<'a>> = history
            .iter()
            .map(|turn| ChatMessage {
                role: turn.role.as_str(),
                content: &turn.content,
            })
            .collect();
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiChat {
    async fn complete(&self, history: &[ConversationTurn], prompt: &str) -> LlmResult<String> {
        let request = self.build_request(history, prompt);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_history_then_prompt() -> Result<(), serde_json::Error> {
        let chat = OpenAiChat::new("k", "http://localhost:1234/v1", "gpt-4o-mini", 0.7);
        let history = [
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello!"),
        ];

        let request = chat.build_request(&history, "classify me");

        let roles: Vec<&str> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, ["user", "assistant", "user"]);
        let contents: Vec<&str> = request.messages.iter().map(|m| m.content).collect();
        assert_eq!(contents, ["hi", "hello!", "classify me"]);

        let json = serde_json::to_value(&request)?;
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["temperature"], 0.7);
        Ok(())
    }

    #[test]
    fn request_without_history_is_prompt_only() {
        let chat = OpenAiChat::new("k", "http://localhost:1234/v1", "m", 0.2);
        let request = chat.build_request(&[], "hello");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
    }

    #[test]
    fn response_picks_first_message_content() -> Result<(), serde_json::Error> {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"workout"}}]}"#,
        )?;
        let text = body.choices.into_iter().find_map(|c| c.message.content);
        assert_eq!(text.as_deref(), Some("workout"));
        Ok(())
    }

    #[test]
    fn from_config_requires_key() {
        let config = LlmConfig::default();
        assert!(matches!(
            OpenAiChat::from_config(&config),
            Err(LlmError::Config(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let chat = OpenAiChat::new("k", "http://localhost:1234/v1/", "m", 0.2);
        assert_eq!(chat.base_url, "http://localhost:1234/v1");
        assert_eq!(chat.model_name(), "m");
    }
}
