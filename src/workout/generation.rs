//! Language-model generated workouts, used when retrieval cannot help.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::conversation::ConversationTurn;
use crate::llm::{LanguageModel, LlmError};

use super::catalog::Resolution;
use super::session::SessionType;

/// Failure to produce a generated workout.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The completion call failed.
    #[error("workout generation call failed: {0}")]
    Llm(#[from] LlmError),
    /// The completion contained no bracketed payload.
    #[error("no JSON array found in generated workout")]
    MissingPayload,
    /// The bracketed payload did not parse.
    #[error("generated workout is malformed: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// One generated exercise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedExercise {
    /// Exercise name.
    #[serde(alias = "Name", alias = "exercise")]
    pub name: String,
    /// Short description.
    #[serde(default, alias = "Description")]
    pub description: String,
    /// Reps or timing.
    #[serde(
        default,
        deserialize_with = "text_or_number",
        alias = "recommendedReps",
        alias = "Reps"
    )]
    pub reps: String,
    /// Sets or rounds.
    #[serde(
        default,
        deserialize_with = "text_or_number",
        alias = "recommendedSets",
        alias = "Sets"
    )]
    pub sets: String,
    /// Block the exercise belongs to; unknown or missing values mean `main`.
    #[serde(
        default = "main_block",
        deserialize_with = "lenient_session_type",
        alias = "session_type",
        alias = "SessionType"
    )]
    pub session_type: SessionType,
}

/// Accept `"10"`, `10` and `null` for prescriptions.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

const fn main_block() -> SessionType {
    SessionType::Main
}

/// Map `"Warm Up"`, `"cool-down"` and similar spellings onto a block.
fn lenient_session_type<'de, D>(deserializer: D) -> Result<SessionType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let normalized: String = value
        .as_str()
        .unwrap_or_default()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect();

    Ok(match normalized.as_str() {
        "warmup" => SessionType::Warmup,
        "cooldown" => SessionType::Cooldown,
        _ => SessionType::Main,
    })
}

/// What the user asked for, to bias the generation prompt.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FallbackContext {
    /// Workout label, e.g. `"cardio and yoga"` or the raw question.
    pub workout_type: String,
    /// Whether the label came from recognized vocabulary.
    pub recognized: bool,
    /// Interval timing requested.
    pub is_hiit: bool,
    /// Light morning routine requested.
    pub is_morning: bool,
}

impl FallbackContext {
    /// Context for a phrase outside the supported vocabulary.
    #[must_use]
    pub fn unsupported(question: &str) -> Self {
        Self {
            workout_type: question.to_string(),
            ..Self::default()
        }
    }

    /// Context for recognized vocabulary the database could not serve.
    #[must_use]
    pub fn from_resolution(resolution: &Resolution) -> Self {
        Self {
            workout_type: resolution.label(),
            recognized: true,
            is_hiit: resolution.is_hiit,
            is_morning: resolution.is_morning,
        }
    }

    /// Build the generation prompt.
    #[must_use]
    pub fn prompt(&self) -> String {
        let workout_type = &self.workout_type;
        let mut prompt = if self.recognized {
            format!("You are a fitness expert. The user requested a {workout_type} workout, ")
        } else {
            format!("You are a fitness expert. The user requested a \"{workout_type}\" workout, ")
        };
        prompt.push_str(
            "but the exercise database lacks sufficient data. Generate a workout session with \
             2 warmup exercises, 5 main exercises, and 2 cooldown exercises. For each exercise, provide:\n\
             - name\n\
             - description (short, 1-2 sentences)\n\
             - reps (recommended reps or timing)\n\
             - sets (recommended sets or rounds)\n\
             - sessionType (warmup, main, cooldown)\n",
        );

        if self.recognized {
            let mut hints = Vec::new();
            if self.is_hiit {
                hints.push("- Use HIIT format: 20s work, 10s rest, 3-4 rounds.");
            }
            if self.is_morning {
                hints.push("- Use lighter reps/sets for a morning routine.");
            }
            if workout_type.contains("cardio") {
                hints.push("- Focus on bodyweight cardio exercises like jumping jacks or high knees.");
            }
            if workout_type.contains("yoga") {
                hints.push("- Focus on bodyweight yoga poses or stretches like downward dog.");
            }
            if workout_type.contains("hiit") {
                hints.push("- Include dynamic, high-intensity exercises like burpees.");
            }
            if !hints.is_empty() {
                prompt.push_str(&format!("For {workout_type}:\n"));
                for hint in hints {
                    prompt.push_str(hint);
                    prompt.push('\n');
                }
            }
        }

        prompt.push_str(
            "Return the response as a JSON array of objects with the keys \
             name, description, reps, sets, sessionType.",
        );
        prompt
    }
}

/// Slice from the first `[` to the last `]`, inclusive.
///
/// # Errors
/// Returns [`GenerationError::MissingPayload`] when either bracket is absent
/// or they are out of order.
pub fn extract_json_array(text: &str) -> Result<&str, GenerationError> {
    let start = text.find('[').ok_or(GenerationError::MissingPayload)?;
    let end = text.rfind(']').ok_or(GenerationError::MissingPayload)?;
    if end < start {
        return Err(GenerationError::MissingPayload);
    }
    Ok(&text[start..=end])
}

/// Parse generated exercises out of free completion text.
///
/// # Errors
/// Distinguishes a missing payload from a malformed one.
pub fn parse_generated_workout(text: &str) -> Result<Vec<GeneratedExercise>, GenerationError> {
    let payload = extract_json_array(text)?;
    debug!(payload, "extracted generated workout payload");
    Ok(serde_json::from_str(payload)?)
}

/// Ask the model for a full session and parse it.
///
/// # Errors
/// Returns an error if the call fails or its output cannot be parsed. The
/// call is not retried.
pub async fn generate_workout(
    llm: &dyn LanguageModel,
    history: &[ConversationTurn],
    context: &FallbackContext,
) -> Result<Vec<GeneratedExercise>, GenerationError> {
    let raw = llm.complete(history, &context.prompt()).await?;
    debug!(raw = %raw, "raw generated workout");
    parse_generated_workout(&raw)
}
