//! External content providers.
//!
//! Retrieval logic talks to two capability traits so it can run against
//! fakes in tests:
//! - [`ExerciseProvider`]: exercise listings plus per-exercise media.
//! - [`RecipeProvider`]: recipe categories, listings and details.
//!
//! HTTP implementations: [`WgerClient`] and [`MealDbClient`].

pub mod error;
pub mod mealdb;
pub mod types;
pub mod wger;

pub use error::{ProviderError, ProviderResult};
pub use mealdb::MealDbClient;
pub use types::{ExerciseQuery, ExerciseRecord, Meal, MealSummary, NamedRef};
pub use wger::WgerClient;

use async_trait::async_trait;

/// Exercise database capability.
#[async_trait]
pub trait ExerciseProvider: Send + Sync {
    /// List exercises matching `query`.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    async fn exercises(&self, query: &ExerciseQuery) -> ProviderResult<Vec<ExerciseRecord>>;

    /// Number of demonstration videos attached to an exercise.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    async fn video_count(&self, exercise_id: u64) -> ProviderResult<usize>;

    /// Image URLs attached to an exercise.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    async fn image_urls(&self, exercise_id: u64) -> ProviderResult<Vec<String>>;
}

/// Recipe database capability.
#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Names of every recipe category.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    async fn categories(&self) -> ProviderResult<Vec<String>>;

    /// Recipes filed under `category`; empty when the category is unknown.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    async fn meals_in_category(&self, category: &str) -> ProviderResult<Vec<MealSummary>>;

    /// Full recipe for `meal_id`, if it exists.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    async fn meal_details(&self, meal_id: &str) -> ProviderResult<Option<Meal>>;
}
