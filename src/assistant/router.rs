//! The chat pipeline: classify, branch, record.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::conversation::{ConversationStore, ConversationTurn};
use crate::llm::LanguageModel;
use crate::meal::{MealError, MealRecommendation, recommend_meals, summarize_meals};
use crate::providers::{ExerciseProvider, RecipeProvider};
use crate::workout::{
    FallbackContext, GeneratedExercise, NormalizedWorkoutRequest, RetrievalOutcome, SessionEntry,
    TrainingMode, WorkoutCatalog, WorkoutError, assemble_session, generate_workout, plan_session,
    retrieve_exercises, summarize_session_types,
};

use super::error::AssistantError;
use super::intent::{Intent, classify, general_prompt, strip_wrapping_quotes};

/// User id applied when a request carries none.
pub const GUEST_USER: &str = "guest";

/// A workout session, either assembled from the database or generated.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WorkoutPlan {
    /// Curated warmups, retrieved main block, curated cooldowns.
    Curated(Vec<SessionEntry>),
    /// Language-model generated session.
    Generated(Vec<GeneratedExercise>),
}

impl WorkoutPlan {
    /// Conversation-log summary of the session types.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Curated(entries) => {
                summarize_session_types(entries.iter().map(|e| e.session_type))
            }
            Self::Generated(exercises) => {
                summarize_session_types(exercises.iter().map(|e| e.session_type))
            }
        }
    }
}

/// Reply to one chat question.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AssistantReply {
    /// Recipe suggestions.
    Meal(MealRecommendation),
    /// A workout session.
    Workout {
        /// The session.
        #[serde(rename = "workoutSession")]
        workout_session: WorkoutPlan,
    },
    /// Free-form advice.
    General {
        /// The advice text.
        answer: String,
    },
}

/// Fitness assistant: intent routing over the workout, meal and advice paths.
pub struct Assistant {
    llm: Arc<dyn LanguageModel>,
    exercises: Arc<dyn ExerciseProvider>,
    recipes: Arc<dyn RecipeProvider>,
    catalog: WorkoutCatalog,
    conversations: ConversationStore,
}

impl Assistant {
    /// Assemble an assistant with an empty conversation store.
    #[must_use]
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        exercises: Arc<dyn ExerciseProvider>,
        recipes: Arc<dyn RecipeProvider>,
        catalog: WorkoutCatalog,
    ) -> Self {
        Self {
            llm,
            exercises,
            recipes,
            catalog,
            conversations: ConversationStore::new(),
        }
    }

    /// Per-user conversation logs.
    #[must_use]
    pub const fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// Name of the backing language model.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Answer `question` for `user_id`, recording both turns.
    ///
    /// # Errors
    /// Returns an error if classification, meal retrieval, general advice or
    /// workout generation fails. Exercise retrieval failures fall back to
    /// generation instead.
    pub async fn respond(
        &self,
        question: &str,
        user_id: &str,
    ) -> Result<AssistantReply, AssistantError> {
        let history = self.conversations.history(user_id);
        let intent = classify(self.llm.as_ref(), &history, question, &self.catalog)
            .await
            .map_err(|err| {
                error!(phase = "classify", user_id, "intent classification failed: {err}");
                AssistantError::Classification(err)
            })?;
        info!(user_id, %intent, "question classified");

        self.conversations
            .append(user_id, ConversationTurn::user(question));

        match intent {
            Intent::Meal => self.meal(question, user_id).await,
            Intent::Workout => self.workout(&history, question, user_id).await,
            Intent::General => self.general(&history, question, user_id).await,
        }
    }

    /// Plan a session straight from a normalized request.
    ///
    /// # Errors
    /// See [`plan_session`].
    pub async fn plan_workout(
        &self,
        request: &NormalizedWorkoutRequest,
    ) -> Result<Vec<SessionEntry>, WorkoutError> {
        plan_session(self.exercises.as_ref(), request).await
    }

    /// Recommend meals for a free-text query.
    ///
    /// # Errors
    /// See [`recommend_meals`].
    pub async fn recommend_meals(&self, query: &str) -> Result<MealRecommendation, MealError> {
        recommend_meals(self.llm.as_ref(), self.recipes.as_ref(), query).await
    }

    async fn meal(&self, question: &str, user_id: &str) -> Result<AssistantReply, AssistantError> {
        let recommendation = self.recommend_meals(question).await?;
        self.conversations.append(
            user_id,
            ConversationTurn::assistant(summarize_meals(&recommendation.meals)),
        );
        Ok(AssistantReply::Meal(recommendation))
    }

    async fn workout(
        &self,
        history: &[ConversationTurn],
        question: &str,
        user_id: &str,
    ) -> Result<AssistantReply, AssistantError> {
        let Some(resolution) = self.catalog.resolve(&question.to_lowercase()) else {
            info!(user_id, "no supported workout type, generating a session");
            let context = FallbackContext::unsupported(question);
            return self.generated(history, &context, user_id).await;
        };

        let request = resolution.request();
        let context = FallbackContext::from_resolution(&resolution);

        match retrieve_exercises(self.exercises.as_ref(), &request).await {
            Ok(RetrievalOutcome::Sufficient(candidates)) => {
                let mode = TrainingMode::from_flags(request.is_hiit, request.is_morning);
                let session = assemble_session(candidates, mode, &mut rand::thread_rng());
                Ok(self.record_workout(user_id, WorkoutPlan::Curated(session)))
            }
            Ok(RetrievalOutcome::Insufficient { available }) => {
                warn!(
                    phase = "workout",
                    user_id,
                    available,
                    "not enough exercises available for {}, generating a session",
                    request.describe()
                );
                self.generated(history, &context, user_id).await
            }
            Err(err) => {
                error!(
                    phase = "workout",
                    user_id,
                    status = ?err.status(),
                    "exercise retrieval failed, generating a session: {err}"
                );
                self.generated(history, &context, user_id).await
            }
        }
    }

    async fn generated(
        &self,
        history: &[ConversationTurn],
        context: &FallbackContext,
        user_id: &str,
    ) -> Result<AssistantReply, AssistantError> {
        let exercises = generate_workout(self.llm.as_ref(), history, context)
            .await
            .map_err(|err| {
                error!(phase = "generation", user_id, "workout generation failed: {err}");
                AssistantError::from(err)
            })?;
        Ok(self.record_workout(user_id, WorkoutPlan::Generated(exercises)))
    }

    fn record_workout(&self, user_id: &str, plan: WorkoutPlan) -> AssistantReply {
        self.conversations
            .append(user_id, ConversationTurn::assistant(plan.summary()));
        AssistantReply::Workout {
            workout_session: plan,
        }
    }

    async fn general(
        &self,
        history: &[ConversationTurn],
        question: &str,
        user_id: &str,
    ) -> Result<AssistantReply, AssistantError> {
        let raw = self
            .llm
            .complete(history, &general_prompt(question))
            .await
            .map_err(|err| {
                error!(phase = "general", user_id, "general advice failed: {err}");
                AssistantError::General(err)
            })?;
        let answer = strip_wrapping_quotes(&raw).to_string();
        self.conversations
            .append(user_id, ConversationTurn::assistant(answer.clone()));
        Ok(AssistantReply::General { answer })
    }
}
