//! Provider-neutral records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Exercise listing filter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ExerciseQuery {
    /// Primitive category id.
    pub category: Option<u32>,
    /// Equipment id.
    pub equipment: Option<u32>,
}

impl ExerciseQuery {
    /// Query one category, optionally narrowed by equipment.
    #[must_use]
    pub const fn category(category: u32, equipment: Option<u32>) -> Self {
        Self {
            category: Some(category),
            equipment,
        }
    }

    /// Query across all categories, optionally narrowed by equipment.
    #[must_use]
    pub const fn any_category(equipment: Option<u32>) -> Self {
        Self {
            category: None,
            equipment,
        }
    }
}

/// Id + name pair as the exercise database nests them.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    /// Identifier.
    #[serde(default)]
    pub id: u32,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Exercise as returned by the exercise database.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    /// Provider id.
    pub id: u64,
    /// Exercise name.
    #[serde(default)]
    pub name: String,
    /// Free-text (often HTML) description.
    #[serde(default)]
    pub description: String,
    /// Muscle-group category.
    #[serde(default)]
    pub category: NamedRef,
    /// Required equipment.
    #[serde(default)]
    pub equipment: Vec<NamedRef>,
    /// Trained muscles.
    #[serde(default)]
    pub muscles: Vec<NamedRef>,
}

impl ExerciseRecord {
    /// Whether name or description contains any keyword, case-insensitively.
    #[must_use]
    pub fn mentions_any(&self, keywords: &[String]) -> bool {
        let haystack = format!("{} {}", self.name, self.description).to_lowercase();
        keywords
            .iter()
            .any(|keyword| haystack.contains(&keyword.to_lowercase()))
    }
}

/// Recipe listing entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MealSummary {
    /// Provider id.
    #[serde(rename = "idMeal")]
    pub id: String,
    /// Recipe name.
    #[serde(rename = "strMeal", default)]
    pub name: String,
    /// Thumbnail URL.
    #[serde(rename = "strMealThumb", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Full recipe, passed through untouched from the provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meal(Map<String, Value>);

impl Meal {
    /// Provider id (`idMeal`).
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("idMeal").and_then(Value::as_str)
    }

    /// Recipe name (`strMeal`).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get("strMeal").and_then(Value::as_str)
    }
}
