//! Workout category specifications and their normalized form.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Structured category filter used by composite workout types.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CategoryFilter {
    /// Primitive category ids to query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u32>>,
    /// Equipment id to filter by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<u32>,
    /// Keywords, at least one of which must appear in name or description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

/// One resolved entry: a primitive category id or a structured filter.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryEntry {
    /// Primitive category id.
    Category(u32),
    /// Structured filter.
    Filter(CategoryFilter),
}

/// Wire shape of a body-part request.
///
/// A single entry is sent bare rather than as a one-element list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodyPartSpec {
    /// Exactly one entry.
    Single(CategoryEntry),
    /// Several entries.
    Many(Vec<CategoryEntry>),
}

impl BodyPartSpec {
    /// Build the wire shape, collapsing a one-element list.
    #[must_use]
    pub fn from_entries(mut entries: Vec<CategoryEntry>) -> Self {
        if entries.len() == 1 {
            if let Some(entry) = entries.pop() {
                return Self::Single(entry);
            }
        }
        Self::Many(entries)
    }

    /// Entries in order.
    #[must_use]
    pub fn entries(&self) -> &[CategoryEntry] {
        match self {
            Self::Single(entry) => std::slice::from_ref(entry),
            Self::Many(entries) => entries,
        }
    }
}

/// Normalized exercise retrieval request.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NormalizedWorkoutRequest {
    /// Deduplicated primitive category ids.
    pub category_ids: BTreeSet<u32>,
    /// Equipment id; the last entry that names one wins.
    pub equipment: Option<u32>,
    /// Deduplicated keywords, in first-seen order.
    pub keywords: Vec<String>,
    /// Interval-training mode.
    pub is_hiit: bool,
    /// Light morning mode.
    pub is_morning: bool,
}

impl NormalizedWorkoutRequest {
    /// Merge every entry of `spec` into one request.
    #[must_use]
    pub fn from_spec(spec: &BodyPartSpec, is_hiit: bool, is_morning: bool) -> Self {
        let mut request = Self {
            is_hiit,
            is_morning,
            ..Self::default()
        };

        for entry in spec.entries() {
            match entry {
                CategoryEntry::Category(id) => {
                    request.category_ids.insert(*id);
                }
                CategoryEntry::Filter(filter) => {
                    if let Some(categories) = &filter.categories {
                        request.category_ids.extend(categories.iter().copied());
                    }
                    if filter.equipment.is_some() {
                        request.equipment = filter.equipment;
                    }
                    for keyword in filter.keywords.iter().flatten() {
                        if !request.keywords.contains(keyword) {
                            request.keywords.push(keyword.clone());
                        }
                    }
                }
            }
        }

        request
    }

    /// True when the request selects nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category_ids.is_empty() && self.equipment.is_none() && self.keywords.is_empty()
    }

    /// Human-readable description of what was asked for.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.keywords.is_empty() {
            let ids: Vec<String> = self.category_ids.iter().map(u32::to_string).collect();
            format!("categories {}", ids.join(", "))
        } else {
            self.keywords.join(", ")
        }
    }
}
