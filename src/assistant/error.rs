//! Router-level failures and their public rendering.

use axum::http::StatusCode;
use thiserror::Error;

use crate::llm::LlmError;
use crate::meal::MealError;
use crate::workout::GenerationError;

/// Failure to answer a chat question.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The intent classification call failed.
    #[error("intent classification failed: {0}")]
    Classification(#[source] LlmError),
    /// The generated workout could not be parsed.
    #[error("generated workout could not be parsed: {0}")]
    FallbackWorkout(#[source] GenerationError),
    /// The workout generation call failed.
    #[error("workout generation call failed: {0}")]
    WorkoutData(#[source] LlmError),
    /// Meal retrieval failed.
    #[error(transparent)]
    Meal(#[from] MealError),
    /// The general-advice call failed.
    #[error("general advice call failed: {0}")]
    General(#[source] LlmError),
}

impl From<GenerationError> for AssistantError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Llm(source) => Self::WorkoutData(source),
            other => Self::FallbackWorkout(other),
        }
    }
}

impl AssistantError {
    /// HTTP status for this failure.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Message safe to show to the caller.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::FallbackWorkout(_) => "Failed to generate fallback workout.",
            Self::WorkoutData(_) => "An error occurred while fetching workout data.",
            Self::Meal(_) => "Failed to fetch meal suggestions.",
            Self::Classification(_) | Self::General(_) => {
                "An error occurred while processing your question."
            }
        }
    }
}
