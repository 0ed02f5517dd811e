//! Application state shared across all request handlers.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::assistant::Assistant;
use crate::config::{AppConfig, ConfigError};
use crate::llm::{LlmError, build_language_model};
use crate::providers::{MealDbClient, WgerClient};
use crate::workout::{CatalogError, WorkoutCatalog};

/// Timeout applied to every provider request.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to assemble the application state.
#[derive(Debug, Error)]
pub enum StateError {
    /// Configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The workout vocabulary failed to compile.
    #[error("workout catalog: {0}")]
    Catalog(#[from] CatalogError),
    /// The language-model backend could not be built.
    #[error("language model: {0}")]
    Llm(#[from] LlmError),
    /// The provider HTTP client could not be built.
    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Shared application state.
pub struct AppState {
    /// The chat assistant and its collaborators.
    pub assistant: Assistant,
    /// Configuration the state was built from.
    pub config: AppConfig,
}

impl AppState {
    /// Wrap an already assembled assistant.
    #[must_use]
    pub fn new(assistant: Assistant, config: AppConfig) -> Arc<Self> {
        Arc::new(Self { assistant, config })
    }

    /// Validate `config` and build every collaborator from it.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or a client cannot
    /// be created.
    pub fn from_config(config: AppConfig) -> Result<Arc<Self>, StateError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("fitbot-agent/", env!("CARGO_PKG_VERSION")))
            .timeout(PROVIDER_TIMEOUT)
            .build()?;

        let exercises = Arc::new(WgerClient::new(
            http.clone(),
            config.providers.wger_base_url.clone(),
        ));
        let recipes = Arc::new(MealDbClient::new(
            http,
            config.providers.mealdb_base_url.clone(),
        ));
        let llm = build_language_model(&config.llm)?;
        let assistant = Assistant::new(llm, exercises, recipes, WorkoutCatalog::builtin()?);

        Ok(Self::new(assistant, config))
    }
}
