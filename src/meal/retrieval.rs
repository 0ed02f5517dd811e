//! Language-model assisted recipe retrieval.
//!
//! The model picks one category from the provider's own list. Anything it
//! answers outside that list (including `unknown`) sends retrieval to a
//! pooled draw over [`FALLBACK_CATEGORIES`].

use std::collections::HashMap;

use futures::future::try_join_all;
use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::llm::{LanguageModel, LlmError};
use crate::providers::{Meal, MealSummary, ProviderError, RecipeProvider};

/// Number of meals returned per recommendation.
pub const MEAL_PICKS: usize = 3;

/// Categories pooled when the model cannot pick one.
pub const FALLBACK_CATEGORIES: [&str; 11] = [
    "Beef",
    "Chicken",
    "Dessert",
    "Lamb",
    "Pasta",
    "Pork",
    "Seafood",
    "Side",
    "Vegan",
    "Vegetarian",
    "Breakfast",
];

/// Message attached to every meal recommendation.
pub const MEAL_MESSAGE: &str = "Here are meal suggestions based on your query.";

/// Failure to recommend meals.
#[derive(Debug, Error)]
pub enum MealError {
    /// The recipe provider failed.
    #[error("recipe lookup failed: {0}")]
    Provider(#[from] ProviderError),
    /// The category selection call failed.
    #[error("meal category selection failed: {0}")]
    Llm(#[from] LlmError),
}

/// Meals with the fixed recommendation message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MealRecommendation {
    /// Always [`MEAL_MESSAGE`].
    pub message: String,
    /// Zero to three detailed meals.
    pub meals: Vec<Meal>,
}

impl MealRecommendation {
    /// Wrap detailed meals with the standard message.
    #[must_use]
    pub fn new(meals: Vec<Meal>) -> Self {
        Self {
            message: MEAL_MESSAGE.to_string(),
            meals,
        }
    }
}

/// Prompt asking the model to choose one of `categories` for `query`.
#[must_use]
pub fn category_prompt(query: &str, categories: &[String]) -> String {
    format!(
        "The user wants a meal based on the prompt: \"{query}\".\n\n\
         Which one category from this list best fits the user's request?\n\n\
         {}\n\n\
         Return only the category name (exactly as is), or \"unknown\" if none matches.",
        categories.join(", ")
    )
}

/// Recommend up to [`MEAL_PICKS`] detailed meals for `query`.
///
/// # Errors
/// Returns an error if the category call or any provider call fails.
pub async fn recommend_meals(
    llm: &dyn LanguageModel,
    recipes: &dyn RecipeProvider,
    query: &str,
) -> Result<MealRecommendation, MealError> {
    let result = pick_meals(llm, recipes, query).await;
    result.inspect_err(|err| {
        if let MealError::Provider(provider_err) = err {
            error!(
                phase = "meal",
                status = ?provider_err.status(),
                body = provider_err.body().unwrap_or_default(),
                "meal retrieval failed: {err}"
            );
        } else {
            error!(phase = "meal", "meal retrieval failed: {err}");
        }
    })
}

async fn pick_meals(
    llm: &dyn LanguageModel,
    recipes: &dyn RecipeProvider,
    query: &str,
) -> Result<MealRecommendation, MealError> {
    let categories = recipes.categories().await?;
    let answer = llm.complete(&[], &category_prompt(query, &categories)).await?;
    let chosen = answer.trim();

    let candidates = if categories.iter().any(|c| c == chosen) {
        debug!(category = chosen, "model picked a meal category");
        let mut meals = recipes.meals_in_category(chosen).await?;
        meals.shuffle(&mut rand::thread_rng());
        meals.truncate(MEAL_PICKS);
        meals
    } else {
        debug!(answer = chosen, "no usable meal category, pooling fallback categories");
        let pages = try_join_all(
            FALLBACK_CATEGORIES
                .iter()
                .map(|category| recipes.meals_in_category(category)),
        )
        .await?;
        let mut pooled = dedupe_by_id(pages.into_iter().flatten());
        pooled.shuffle(&mut rand::thread_rng());
        pooled.truncate(MEAL_PICKS);
        pooled
    };

    let details =
        try_join_all(candidates.iter().map(|meal| recipes.meal_details(&meal.id))).await?;

    Ok(MealRecommendation::new(details.into_iter().flatten().collect()))
}

/// Deduplicate by meal id; a later entry replaces an earlier one in place.
fn dedupe_by_id(meals: impl IntoIterator<Item = MealSummary>) -> Vec<MealSummary> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<MealSummary> = Vec::new();

    for meal in meals {
        if let Some(&idx) = positions.get(&meal.id) {
            unique[idx] = meal;
        } else {
            positions.insert(meal.id.clone(), unique.len());
            unique.push(meal);
        }
    }

    unique
}

/// Short summary of suggested meals for the conversation log.
#[must_use]
pub fn summarize_meals(meals: &[Meal]) -> String {
    let names: Vec<&str> = meals.iter().filter_map(Meal::name).collect();
    if names.is_empty() {
        "Suggested meals: No meals found.".to_string()
    } else {
        format!("Suggested meals: {}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::test_support::{FakeRecipes, ScriptedLlm, summary};

    fn seafood() -> Vec<MealSummary> {
        (1..=5)
            .map(|i| summary(&format!("5270{i}"), &format!("Fish dish {i}")))
            .collect()
    }

    #[tokio::test]
    async fn valid_category_draws_three_from_it() -> Result<(), MealError> {
        let recipes = FakeRecipes::new(&["Beef", "Seafood"]).with_meals("Seafood", seafood());
        let llm = ScriptedLlm::new().on("best fits", "  Seafood\n");

        let found = recommend_meals(&llm, &recipes, "something from the sea").await?;

        assert_eq!(found.message, MEAL_MESSAGE);
        assert_eq!(found.meals.len(), 3);
        assert!(
            found
                .meals
                .iter()
                .all(|m| m.name().is_some_and(|n| n.starts_with("Fish dish")))
        );
        assert_eq!(recipes.filtered(), ["Seafood"]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_category_pools_fallbacks() -> Result<(), MealError> {
        let recipes = FakeRecipes::new(&["Beef", "Chicken"])
            .with_meals("Beef", vec![summary("1", "Stew"), summary("2", "Pie")])
            .with_meals("Chicken", vec![summary("2", "Pie"), summary("3", "Curry")]);
        let llm = ScriptedLlm::new().on("best fits", "unknown");

        let found = recommend_meals(&llm, &recipes, "surprise me").await?;

        assert_eq!(found.meals.len(), 3);
        let ids: HashSet<&str> = found.meals.iter().filter_map(Meal::id).collect();
        assert_eq!(ids, HashSet::from(["1", "2", "3"]));
        assert_eq!(recipes.filtered().len(), FALLBACK_CATEGORIES.len());
        Ok(())
    }

    #[tokio::test]
    async fn category_outside_list_is_not_trusted() -> Result<(), MealError> {
        let recipes = FakeRecipes::new(&["Fish"]).with_meals("Fish", seafood());
        let llm = ScriptedLlm::new().on("best fits", "fish");

        let found = recommend_meals(&llm, &recipes, "fish").await?;

        assert!(found.meals.is_empty());
        assert!(!recipes.filtered().contains(&"Fish".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn missing_details_are_dropped() -> Result<(), MealError> {
        let recipes = FakeRecipes::new(&["Side"])
            .with_meals("Side", vec![summary("7", "Fries"), summary("8", "Slaw")])
            .without_details("8");
        let llm = ScriptedLlm::new().on("best fits", "Side");

        let found = recommend_meals(&llm, &recipes, "a side").await?;

        assert_eq!(found.meals.len(), 1);
        assert_eq!(found.meals[0].name(), Some("Fries"));
        Ok(())
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let recipes = FakeRecipes::new(&["Beef"]).failing(503);
        let llm = ScriptedLlm::new().on("best fits", "Beef");

        let result = recommend_meals(&llm, &recipes, "beef").await;

        assert!(matches!(result, Err(MealError::Provider(_))));
        assert!(llm.calls().is_empty());
    }

    #[test]
    fn prompt_lists_categories_verbatim() {
        let prompt = category_prompt("dinner", &["Beef".to_string(), "Side".to_string()]);
        assert!(prompt.contains("\"dinner\""));
        assert!(prompt.contains("Beef, Side"));
        assert!(prompt.contains("\"unknown\""));
    }

    #[test]
    fn summary_names_meals() {
        assert_eq!(summarize_meals(&[]), "Suggested meals: No meals found.");
    }
}
