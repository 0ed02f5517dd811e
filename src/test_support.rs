//! Deterministic stand-ins for the external collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use crate::conversation::ConversationTurn;
use crate::llm::{LanguageModel, LlmError, LlmResult};
use crate::providers::{
    ExerciseProvider, ExerciseQuery, ExerciseRecord, Meal, MealSummary, NamedRef, ProviderError,
    ProviderResult, RecipeProvider,
};

/// Minimal exercise record.
pub fn record(id: u64, name: &str) -> ExerciseRecord {
    ExerciseRecord {
        id,
        name: name.to_string(),
        description: format!("How to do {name}"),
        category: NamedRef {
            id: 10,
            name: "Abs".to_string(),
        },
        equipment: Vec::new(),
        muscles: Vec::new(),
    }
}

/// In-memory exercise provider.
#[derive(Default)]
pub struct FakeExercises {
    by_category: HashMap<Option<u32>, Vec<ExerciseRecord>>,
    images: HashMap<u64, Vec<String>>,
    videos: HashSet<u64>,
    fail_status: Option<u16>,
    pub listing_calls: AtomicUsize,
    pub media_calls: AtomicUsize,
}

impl FakeExercises {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: u32, records: Vec<ExerciseRecord>) -> Self {
        self.by_category.insert(Some(category), records);
        self
    }

    pub fn with_any_category(mut self, records: Vec<ExerciseRecord>) -> Self {
        self.by_category.insert(None, records);
        self
    }

    pub fn with_images(mut self, id: u64, urls: &[&str]) -> Self {
        self.images
            .insert(id, urls.iter().map(|u| (*u).to_string()).collect());
        self
    }

    pub fn with_video(mut self, id: u64) -> Self {
        self.videos.insert(id);
        self
    }

    pub const fn failing(mut self, status: u16) -> Self {
        self.fail_status = Some(status);
        self
    }

    fn check(&self) -> ProviderResult<()> {
        match self.fail_status {
            Some(status) => Err(ProviderError::Status {
                provider: "fake-wger",
                status,
                body: "unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExerciseProvider for FakeExercises {
    async fn exercises(&self, query: &ExerciseQuery) -> ProviderResult<Vec<ExerciseRecord>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .by_category
            .get(&query.category)
            .cloned()
            .unwrap_or_default())
    }

    async fn video_count(&self, exercise_id: u64) -> ProviderResult<usize> {
        self.media_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(usize::from(self.videos.contains(&exercise_id)))
    }

    async fn image_urls(&self, exercise_id: u64) -> ProviderResult<Vec<String>> {
        self.media_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.images.get(&exercise_id).cloned().unwrap_or_default())
    }
}

/// Minimal recipe listing entry.
pub fn summary(id: &str, name: &str) -> MealSummary {
    MealSummary {
        id: id.to_string(),
        name: name.to_string(),
        thumbnail: None,
    }
}

/// In-memory recipe provider.
#[derive(Default)]
pub struct FakeRecipes {
    categories: Vec<String>,
    by_category: HashMap<String, Vec<MealSummary>>,
    missing_details: HashSet<String>,
    fail_status: Option<u16>,
    pub filter_calls: Mutex<Vec<String>>,
}

impl FakeRecipes {
    pub fn new(categories: &[&str]) -> Self {
        Self {
            categories: categories.iter().map(|c| (*c).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_meals(mut self, category: &str, meals: Vec<MealSummary>) -> Self {
        self.by_category.insert(category.to_string(), meals);
        self
    }

    pub fn without_details(mut self, id: &str) -> Self {
        self.missing_details.insert(id.to_string());
        self
    }

    pub const fn failing(mut self, status: u16) -> Self {
        self.fail_status = Some(status);
        self
    }

    pub fn filtered(&self) -> Vec<String> {
        self.filter_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> ProviderResult<()> {
        match self.fail_status {
            Some(status) => Err(ProviderError::Status {
                provider: "fake-mealdb",
                status,
                body: "unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecipeProvider for FakeRecipes {
    async fn categories(&self) -> ProviderResult<Vec<String>> {
        self.check()?;
        Ok(self.categories.clone())
    }

    async fn meals_in_category(&self, category: &str) -> ProviderResult<Vec<MealSummary>> {
        self.check()?;
        if let Ok(mut calls) = self.filter_calls.lock() {
            calls.push(category.to_string());
        }
        Ok(self.by_category.get(category).cloned().unwrap_or_default())
    }

    async fn meal_details(&self, meal_id: &str) -> ProviderResult<Option<Meal>> {
        self.check()?;
        if self.missing_details.contains(meal_id) {
            return Ok(None);
        }
        let name = self
            .by_category
            .values()
            .flatten()
            .find(|m| m.id == meal_id)
            .map_or_else(|| format!("Meal {meal_id}"), |m| m.name.clone());
        let value = json!({ "idMeal": meal_id, "strMeal": name, "strInstructions": "Cook." });
        Ok(serde_json::from_value(value).ok())
    }
}

/// Recorded language-model call.
#[derive(Clone, Debug)]
pub struct LlmCall {
    pub history: Vec<ConversationTurn>,
    pub prompt: String,
}

/// Language model answering from a list of `(prompt needle, reply)` rules.
///
/// The first rule whose needle occurs in the prompt wins; unmatched prompts
/// fail with [`LlmError::EmptyResponse`].
#[derive(Default)]
pub struct ScriptedLlm {
    rules: Vec<(String, String)>,
    calls: Mutex<Vec<LlmCall>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), reply.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<LlmCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLlm {
    async fn complete(&self, history: &[ConversationTurn], prompt: &str) -> LlmResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(LlmCall {
                history: history.to_vec(),
                prompt: prompt.to_string(),
            });
        }
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
