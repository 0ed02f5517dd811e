//! Process configuration read from the environment.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default chat model for the OpenAI-compatible backend.
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// Default model for the Ollama backend.
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";
/// Default OpenAI-compatible API base.
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default exercise database base URL.
const DEFAULT_WGER_BASE_URL: &str = "https://wger.de/api/v2";
/// Default recipe database base URL.
const DEFAULT_MEALDB_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration errors detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A base URL could not be parsed.
    #[error("invalid url for {name}: {source}")]
    InvalidUrl {
        /// Setting that held the URL.
        name: &'static str,
        /// Parse failure.
        source: url::ParseError,
    },
    /// A required setting is absent.
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    /// A setting has an unsupported value.
    #[error("invalid value for {name}: {value}")]
    InvalidValue {
        /// Setting name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Which language-model backend to talk to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// OpenAI-compatible `/chat/completions` endpoint.
    #[default]
    OpenAi,
    /// Local or remote Ollama through Rig.
    Ollama,
}

impl LlmBackend {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                name: "FITBOT_LLM_PROVIDER",
                value: value.to_string(),
            }),
        }
    }
}

/// Runtime mode; selects the scheme used for the service's own base URL.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Local development, plain HTTP.
    Development,
    /// Deployed behind TLS.
    #[default]
    Production,
}

impl RuntimeMode {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("development") {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// URL scheme for self-referential links.
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Development => "http",
            Self::Production => "https",
        }
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Language-model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Backend to use.
    pub backend: LlmBackend,
    /// Model identifier.
    pub model: String,
    /// API key (OpenAI backend only).
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL; `None` uses the backend default.
    pub base_url: Option<String>,
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::OpenAi,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            api_key: None,
            base_url: Some(DEFAULT_OPENAI_BASE_URL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// External content provider endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Exercise database base URL, without trailing slash.
    pub wger_base_url: String,
    /// Recipe database base URL, without trailing slash.
    pub mealdb_base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            wger_base_url: DEFAULT_WGER_BASE_URL.to_string(),
            mealdb_base_url: DEFAULT_MEALDB_BASE_URL.to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
    /// Runtime mode.
    pub mode: RuntimeMode,
    /// Public host (and optional port) the service is reached at.
    pub public_host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: RuntimeMode::Production,
            public_host: format!("localhost:{DEFAULT_PORT}"),
        }
    }
}

impl ServerConfig {
    /// Base URL the service advertises for itself.
    #[must_use]
    pub fn public_base_url(&self) -> String {
        format!("{}://{}", self.mode.scheme(), self.public_host)
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language-model settings.
    pub llm: LlmConfig,
    /// Provider endpoints.
    pub providers: ProviderConfig,
    /// Server settings.
    pub server: ServerConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a setting has an unsupported value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns an error if a setting has an unsupported value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = lookup("FITBOT_LLM_PROVIDER")
            .map(|value| LlmBackend::parse(&value))
            .transpose()?
            .unwrap_or_default();

        let llm = match backend {
            LlmBackend::OpenAi => LlmConfig {
                backend,
                model: lookup("FITBOT_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                api_key: lookup("OPENAI_API_KEY"),
                base_url: Some(
                    lookup("OPENAI_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                ),
                temperature: DEFAULT_TEMPERATURE,
            },
            LlmBackend::Ollama => LlmConfig {
                backend,
                model: lookup("FITBOT_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                api_key: None,
                base_url: lookup("FITBOT_OLLAMA_URL"),
                temperature: DEFAULT_TEMPERATURE,
            },
        };

        let temperature = match lookup("FITBOT_TEMPERATURE") {
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                name: "FITBOT_TEMPERATURE",
                value: raw,
            })?,
            None => llm.temperature,
        };

        let providers = ProviderConfig {
            wger_base_url: trim_base(
                lookup("WGER_API_URL").unwrap_or_else(|| DEFAULT_WGER_BASE_URL.to_string()),
            ),
            mealdb_base_url: trim_base(
                lookup("MEALDB_API_URL").unwrap_or_else(|| DEFAULT_MEALDB_BASE_URL.to_string()),
            ),
        };

        let port = match lookup("FITBOT_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "FITBOT_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let mode = lookup("FITBOT_ENV")
            .or_else(|| lookup("NODE_ENV"))
            .map_or(RuntimeMode::Production, |value| RuntimeMode::parse(&value));

        let public_host =
            lookup("FITBOT_PUBLIC_HOST").unwrap_or_else(|| format!("localhost:{port}"));

        Ok(Self {
            llm: LlmConfig { temperature, ..llm },
            providers,
            server: ServerConfig {
                port,
                mode,
                public_host,
            },
        })
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if a URL is malformed or a required key is missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.backend == LlmBackend::OpenAi
            && self.llm.api_key.as_deref().is_none_or(str::is_empty)
        {
            return Err(ConfigError::Missing("OPENAI_API_KEY"));
        }

        if let Some(base_url) = &self.llm.base_url {
            parse_url("llm.base_url", base_url)?;
        }
        parse_url("WGER_API_URL", &self.providers.wger_base_url)?;
        parse_url("MEALDB_API_URL", &self.providers.mealdb_base_url)?;

        Ok(())
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { name, source })
}

fn trim_base(value: String) -> String {
    value.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() -> Result<(), ConfigError> {
        let config = AppConfig::from_lookup(|_| None)?;
        assert_eq!(config.llm.backend, LlmBackend::OpenAi);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.providers.wger_base_url, "https://wger.de/api/v2");
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.mode, RuntimeMode::Production);
        Ok(())
    }

    #[test]
    fn missing_api_key_fails_validation() -> Result<(), ConfigError> {
        let config = AppConfig::from_lookup(|_| None)?;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("OPENAI_API_KEY"))
        ));
        Ok(())
    }

    #[test]
    fn reads_overrides_and_strips_trailing_slash() -> Result<(), ConfigError> {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("WGER_API_URL", "http://localhost:8000/api/v2/"),
            ("FITBOT_PORT", "8080"),
            ("NODE_ENV", "development"),
            ("FITBOT_PUBLIC_HOST", "example.test"),
        ]))?;

        config.validate()?;
        assert_eq!(config.providers.wger_base_url, "http://localhost:8000/api/v2");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.public_base_url(), "http://example.test");
        Ok(())
    }

    #[test]
    fn ollama_backend_needs_no_key() -> Result<(), ConfigError> {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("FITBOT_LLM_PROVIDER", "Ollama"),
            ("FITBOT_OLLAMA_URL", "http://127.0.0.1:11434"),
        ]))?;
        config.validate()?;
        assert_eq!(config.llm.backend, LlmBackend::Ollama);
        assert_eq!(config.llm.base_url.as_deref(), Some("http://127.0.0.1:11434"));
        Ok(())
    }

    #[test]
    fn rejects_unknown_backend_and_bad_port() {
        assert!(AppConfig::from_lookup(lookup_from(&[("FITBOT_LLM_PROVIDER", "bard")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("FITBOT_PORT", "http")])).is_err());
    }

    #[test]
    fn rejects_malformed_provider_url() -> Result<(), ConfigError> {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("MEALDB_API_URL", "not a url"),
        ]))?;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { name: "MEALDB_API_URL", .. })
        ));
        Ok(())
    }
}
