//! Workout planning.
//!
//! - `catalog`: workout vocabulary and the free-text resolver.
//! - `request`: wire and normalized shapes of a workout request.
//! - `retrieval`: two-tier exercise retrieval against the exercise database.
//! - `session`: session assembly with curated warmups and cooldowns.
//! - `generation`: language-model generated sessions when retrieval fails.

pub mod catalog;
pub mod generation;
pub mod request;
pub mod retrieval;
pub mod session;

pub use catalog::{CatalogError, Resolution, WorkoutCatalog};
pub use generation::{FallbackContext, GeneratedExercise, GenerationError, generate_workout};
pub use request::{BodyPartSpec, CategoryEntry, CategoryFilter, NormalizedWorkoutRequest};
pub use retrieval::{
    FilterTier, MIN_EXERCISES, RetrievalOutcome, WorkoutError, fetch_exercises, plan_session,
    retrieve_exercises,
};
pub use session::{
    Exercise, ExerciseId, SessionEntry, SessionType, TrainingMode, assemble_session, summarize_session_types,
};
