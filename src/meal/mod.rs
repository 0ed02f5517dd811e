//! Meal recommendations backed by the recipe database.

pub mod retrieval;

pub use retrieval::{
    FALLBACK_CATEGORIES, MEAL_MESSAGE, MEAL_PICKS, MealError, MealRecommendation,
    category_prompt, recommend_meals, summarize_meals,
};
