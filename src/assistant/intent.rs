//! Intent classification and the general-advice prompt.

use std::fmt;

use crate::conversation::ConversationTurn;
use crate::llm::{LanguageModel, LlmResult};
use crate::workout::WorkoutCatalog;

/// Where a question is routed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Intent {
    /// Recipe suggestions.
    Meal,
    /// Workout session.
    Workout,
    /// Free-form advice.
    General,
}

impl Intent {
    /// Interpret classifier output; anything unrecognized is `General`.
    #[must_use]
    pub fn from_completion(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "meal" => Self::Meal,
            "workout" => Self::Workout,
            _ => Self::General,
        }
    }

    /// Lowercase tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Meal => "meal",
            Self::Workout => "workout",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision prompt for `question`, listing every supported workout word.
#[must_use]
pub fn classification_prompt(question: &str, catalog: &WorkoutCatalog) -> String {
    let vocabulary = catalog.vocabulary().collect::<Vec<_>>().join(", ");
    format!(
        r#"## BOT PERSONA: FitBot Pro

You are FitBot Pro, an energetic, supportive and knowledgeable AI Fitness Assistant.
You help users with personalized workouts, meal suggestions and general fitness advice, always responding in a friendly, concise and motivating tone.

---

## TOOLS OVERVIEW

- **Meal Tool:**
  Use this tool to fetch meal ideas, recipes, ingredients, and cooking instructions.
  Trigger this tool if the user asks for meal recommendations, recipes, or food-related suggestions.

- **Workout Tool:**
  Use this tool to fetch workout routines, exercise recommendations, and fitness plans.
  **Supported workout types for the Workout Tool:**
  {vocabulary}.
  If the user asks for a workout type outside this list, a generated workout is used instead.

- **General Chat:**
  Use this for general health, nutrition, or fitness questions that do not require a specific meal or workout suggestion.

---

## DECISION LOGIC

- If the user asks for a meal recommendation, recipe, or food advice:
  → Use the Meal Tool.

- If the user asks for a workout, exercise, or fitness routine:
  → Use the Workout Tool, whether or not the workout type is in the supported list above.

- If the user asks a general health, nutrition, or fitness question:
  → Use General Chat.

---

## OUTPUT RULES

- Respond with only one word: "meal", "workout", or "general".
- Do not explain your reasoning.
- If the workout type is not supported, still respond "workout" (the fallback logic is handled in code).

---

## EXAMPLES

User: "Can you suggest a healthy dinner?"
→ meal

User: "Give me a HIIT workout for legs."
→ workout

User: "Is it okay to exercise every day?"
→ general

User: "Give me a pilates routine."
→ workout

---

User query: "{question}"
"#
    )
}

/// Classify `question` with prior turns as context.
///
/// # Errors
/// Returns an error if the completion call fails.
pub async fn classify(
    llm: &dyn LanguageModel,
    history: &[ConversationTurn],
    question: &str,
    catalog: &WorkoutCatalog,
) -> LlmResult<Intent> {
    let answer = llm
        .complete(history, &classification_prompt(question, catalog))
        .await?;
    Ok(Intent::from_completion(&answer))
}

/// Prompt for a short, friendly answer to `question`.
#[must_use]
pub fn general_prompt(question: &str) -> String {
    format!(
        "You are a friendly and helpful fitness and health expert. The user has asked the following question:\n\n\
         \"{question}\"\n\n\
         Please provide a concise and accurate response in no more than 100 words. \
         Use a friendly tone and include emojis to make the response engaging.\n\n\
         Examples:\n\
         - \"Eating cake in the morning is not ideal 🍰. It can cause energy spikes and crashes. \
         Try a balanced breakfast like oatmeal or eggs instead! 🥣🍳\"\n\
         - \"Running in the morning is a great way to start your day! 🏃‍♂️ \
         Just make sure to warm up properly and stay hydrated. 💧\"\n\n\
         Now, respond to the user's question in the same style."
    )
}

/// Trim and drop one wrapping quote at either end.
#[must_use]
pub fn strip_wrapping_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    let unopened = trimmed
        .strip_prefix(&['"', '\u{201c}'][..])
        .unwrap_or(trimmed);
    unopened
        .strip_suffix(&['"', '\u{201d}'][..])
        .unwrap_or(unopened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedLlm;
    use crate::workout::catalog::WORKOUT_TOKENS;

    #[test]
    fn only_meal_and_workout_are_recognized() {
        assert_eq!(Intent::from_completion(" Meal\n"), Intent::Meal);
        assert_eq!(Intent::from_completion("WORKOUT"), Intent::Workout);
        assert_eq!(Intent::from_completion("general"), Intent::General);
        assert_eq!(Intent::from_completion("workout."), Intent::General);
        assert_eq!(Intent::from_completion(""), Intent::General);
    }

    #[test]
    fn prompt_lists_whole_vocabulary() -> Result<(), crate::workout::CatalogError> {
        let catalog = WorkoutCatalog::builtin()?;
        let prompt = classification_prompt("Give me a pilates routine.", &catalog);

        assert!(prompt.contains("chest, leg, legs, back"));
        assert!(prompt.contains("hiit, interval, highintensity."));
        for (token, _) in WORKOUT_TOKENS {
            assert!(prompt.contains(token), "{token} missing");
        }
        assert!(prompt.ends_with("User query: \"Give me a pilates routine.\"\n"));
        Ok(())
    }

    #[tokio::test]
    async fn classify_forwards_history() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = WorkoutCatalog::builtin()?;
        let llm = ScriptedLlm::new().on("FitBot Pro", "meal");
        let history = [ConversationTurn::user("hi"), ConversationTurn::assistant("hello")];

        let intent = classify(&llm, &history, "dinner?", &catalog).await?;

        assert_eq!(intent, Intent::Meal);
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].history, history);
        Ok(())
    }

    #[test]
    fn quotes_are_stripped_once() {
        assert_eq!(strip_wrapping_quotes("  \"Stay hydrated 💧\"\n"), "Stay hydrated 💧");
        assert_eq!(strip_wrapping_quotes("\u{201c}Rest days matter\u{201d}"), "Rest days matter");
        assert_eq!(strip_wrapping_quotes("\"\"double\"\""), "\"double\"");
        assert_eq!(strip_wrapping_quotes("no quotes"), "no quotes");
    }

    #[test]
    fn general_prompt_embeds_question() {
        let prompt = general_prompt("Is it okay to exercise every day?");
        assert!(prompt.contains("\"Is it okay to exercise every day?\""));
        assert!(prompt.contains("no more than 100 words"));
    }
}
