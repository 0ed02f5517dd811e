//! Workout vocabulary and the free-text category resolver.
//!
//! Two fixed tables drive resolution:
//! - `WORKOUT_TOKENS`: every supported word and its canonical category id.
//! - composite expansions: synthetic ids (>= 100) that stand for several
//!   primitive categories or for a structured filter.
//!
//! [`WorkoutCatalog::builtin`] compiles the matchers once and checks that
//! every composite id referenced by a token has an expansion.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use super::request::{BodyPartSpec, CategoryEntry, CategoryFilter, NormalizedWorkoutRequest};

/// Bodyweight equipment id in the exercise database.
pub const BODYWEIGHT_EQUIPMENT: u32 = 7;

/// Every primitive muscle-group category the exercise database exposes.
const ALL_CATEGORIES: [u32; 7] = [8, 9, 10, 11, 12, 13, 14];

/// Supported workout words, in resolution order.
pub const WORKOUT_TOKENS: &[(&str, u32)] = &[
    ("chest", 11),
    ("leg", 9),
    ("legs", 9),
    ("back", 12),
    ("arm", 8),
    ("arms", 8),
    ("shoulder", 13),
    ("shoulders", 13),
    ("abs", 10),
    ("ab", 10),
    ("abdominal", 10),
    ("biceps", 1),
    ("triceps", 5),
    ("core", 10),
    ("fullbody", FULL_BODY),
    ("full", FULL_BODY),
    ("upperbody", UPPER_BODY),
    ("lowerbody", LOWER_BODY),
    ("morning", MORNING),
    ("calves", 14),
    ("cardio", CARDIO),
    ("cardiovascular", CARDIO),
    ("yoga", YOGA),
    ("yogic", YOGA),
    ("hiit", HIIT),
    ("interval", HIIT),
    ("highintensity", HIIT),
];

const FULL_BODY: u32 = 100;
const MORNING: u32 = 101;
const UPPER_BODY: u32 = 102;
const LOWER_BODY: u32 = 103;
const CARDIO: u32 = 104;
const YOGA: u32 = 105;
const HIIT: u32 = 106;

/// Tokens that switch the session to interval timing.
const HIIT_TOKENS: [&str; 3] = ["hiit", "interval", "highintensity"];
/// Token that switches the session to lighter volume.
const MORNING_TOKEN: &str = "morning";

/// Errors raised while building the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A token could not be compiled into a matcher.
    #[error("invalid token pattern for {token}: {source}")]
    Pattern {
        /// Offending token.
        token: &'static str,
        /// Regex failure.
        source: regex::Error,
    },
    /// A token maps to a composite id with no expansion.
    #[error("token {token} maps to composite id {id} with no expansion")]
    MissingComposite {
        /// Offending token.
        token: &'static str,
        /// Composite id.
        id: u32,
    },
}

/// Expansion of a synthetic category id.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompositeSpec {
    /// Flat list of primitive ids.
    Categories(Vec<u32>),
    /// Structured filter.
    Filter(CategoryFilter),
}

/// Result of resolving free text against the vocabulary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolution {
    /// Matched tokens, in table order.
    pub tokens: Vec<&'static str>,
    /// Deduplicated entries after composite expansion.
    pub entries: Vec<CategoryEntry>,
    /// Any interval-training token matched.
    pub is_hiit: bool,
    /// The morning token matched.
    pub is_morning: bool,
}

impl Resolution {
    /// Wire shape, collapsing a single entry.
    #[must_use]
    pub fn spec(&self) -> BodyPartSpec {
        BodyPartSpec::from_entries(self.entries.clone())
    }

    /// Retrieval request for the matched entries.
    #[must_use]
    pub fn request(&self) -> NormalizedWorkoutRequest {
        NormalizedWorkoutRequest::from_spec(&self.spec(), self.is_hiit, self.is_morning)
    }

    /// Matched tokens joined for prompts, e.g. `"cardio and yoga"`.
    #[must_use]
    pub fn label(&self) -> String {
        self.tokens.join(" and ")
    }
}

struct TokenMatcher {
    token: &'static str,
    id: u32,
    pattern: Regex,
}

/// Compiled vocabulary plus composite expansions.
pub struct WorkoutCatalog {
    matchers: Vec<TokenMatcher>,
    composites: HashMap<u32, CompositeSpec>,
}

impl WorkoutCatalog {
    /// Build and validate the built-in catalog.
    ///
    /// # Errors
    /// Returns an error if a matcher fails to compile or a composite id has
    /// no expansion.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_tables(WORKOUT_TOKENS, builtin_composites())
    }

    /// Build a catalog from explicit tables.
    ///
    /// # Errors
    /// Same as [`WorkoutCatalog::builtin`].
    pub fn from_tables(
        tokens: &[(&'static str, u32)],
        composites: HashMap<u32, CompositeSpec>,
    ) -> Result<Self, CatalogError> {
        let mut matchers = Vec::with_capacity(tokens.len());
        for &(token, id) in tokens {
            if is_composite(id) && !composites.contains_key(&id) {
                return Err(CatalogError::MissingComposite { token, id });
            }

            let escaped = regex::escape(token);
            let pattern =
                RegexBuilder::new(&format!(r"\b{escaped}\b|,\s*{escaped}\b|and\s+{escaped}\b"))
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| CatalogError::Pattern { token, source })?;
            matchers.push(TokenMatcher { token, id, pattern });
        }

        Ok(Self {
            matchers,
            composites,
        })
    }

    /// Supported words, in table order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.matchers.iter().map(|m| m.token)
    }

    /// Expansion for a composite id.
    #[must_use]
    pub fn composite(&self, id: u32) -> Option<&CompositeSpec> {
        self.composites.get(&id)
    }

    /// Resolve free text into category entries; `None` when no word matches.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Option<Resolution> {
        let matched: Vec<&TokenMatcher> = self
            .matchers
            .iter()
            .filter(|m| m.pattern.is_match(text))
            .collect();

        if matched.is_empty() {
            return None;
        }

        let mut entries: Vec<CategoryEntry> = Vec::new();
        let mut push_unique = |entry: CategoryEntry| {
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        };

        for matcher in &matched {
            match self.composites.get(&matcher.id) {
                Some(CompositeSpec::Categories(ids)) => {
                    for id in ids {
                        push_unique(CategoryEntry::Category(*id));
                    }
                }
                Some(CompositeSpec::Filter(filter)) => {
                    push_unique(CategoryEntry::Filter(filter.clone()));
                }
                None => push_unique(CategoryEntry::Category(matcher.id)),
            }
        }

        let tokens: Vec<&'static str> = matched.iter().map(|m| m.token).collect();
        let is_hiit = tokens.iter().any(|t| HIIT_TOKENS.contains(t));
        let is_morning = tokens.contains(&MORNING_TOKEN);

        Some(Resolution {
            tokens,
            entries,
            is_hiit,
            is_morning,
        })
    }
}

const fn is_composite(id: u32) -> bool {
    id >= 100
}

fn keywords(words: &[&str]) -> Option<Vec<String>> {
    Some(words.iter().map(|w| (*w).to_string()).collect())
}

fn builtin_composites() -> HashMap<u32, CompositeSpec> {
    HashMap::from([
        (FULL_BODY, CompositeSpec::Categories(ALL_CATEGORIES.to_vec())),
        (MORNING, CompositeSpec::Categories(ALL_CATEGORIES.to_vec())),
        (UPPER_BODY, CompositeSpec::Categories(vec![8, 11, 12, 13])),
        (LOWER_BODY, CompositeSpec::Categories(vec![9, 14])),
        (
            CARDIO,
            CompositeSpec::Filter(CategoryFilter {
                categories: None,
                equipment: Some(BODYWEIGHT_EQUIPMENT),
                keywords: keywords(&["jump", "run", "jumping", "aerobic", "cardio", "high knee"]),
            }),
        ),
        (
            YOGA,
            CompositeSpec::Filter(CategoryFilter {
                categories: None,
                equipment: Some(BODYWEIGHT_EQUIPMENT),
                keywords: keywords(&["yoga", "pose", "stretch", "plank", "balance"]),
            }),
        ),
        (
            HIIT,
            CompositeSpec::Filter(CategoryFilter {
                categories: Some(ALL_CATEGORIES.to_vec()),
                equipment: Some(BODYWEIGHT_EQUIPMENT),
                keywords: keywords(&["burpee", "mountain climber", "squat", "jump", "dynamic"]),
            }),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::error::Error;

    use super::*;

    type TestResult = Result<(), Box<dyn Error>>;

    #[test]
    fn builtin_tables_are_consistent() -> TestResult {
        let catalog = WorkoutCatalog::builtin()?;
        for &(_, id) in WORKOUT_TOKENS {
            if is_composite(id) {
                assert!(catalog.composite(id).is_some(), "missing expansion for {id}");
            }
        }
        assert_eq!(catalog.vocabulary().count(), WORKOUT_TOKENS.len());
        Ok(())
    }

    #[test]
    fn dangling_composite_is_rejected() {
        let result = WorkoutCatalog::from_tables(&[("pilates", 150)], HashMap::new());
        assert!(matches!(
            result,
            Err(CatalogError::MissingComposite { token: "pilates", id: 150 })
        ));
    }

    #[test]
    fn chest_and_back_resolve_to_primitives() -> TestResult {
        let resolution = WorkoutCatalog::builtin()?
            .resolve("chest and back")
            .ok_or("no match")?;
        assert_eq!(resolution.tokens, ["chest", "back"]);
        assert_eq!(
            resolution.entries,
            [CategoryEntry::Category(11), CategoryEntry::Category(12)]
        );
        assert_eq!(resolution.request().category_ids, BTreeSet::from([11, 12]));
        assert!(!resolution.is_hiit);
        Ok(())
    }

    #[test]
    fn comma_separated_tokens_match() -> TestResult {
        let resolution = WorkoutCatalog::builtin()?
            .resolve("chest, triceps please")
            .ok_or("no match")?;
        assert_eq!(resolution.tokens, ["chest", "triceps"]);
        assert_eq!(
            resolution.entries,
            [CategoryEntry::Category(11), CategoryEntry::Category(5)]
        );
        Ok(())
    }

    #[test]
    fn cardio_and_yoga_yield_two_filters() -> TestResult {
        let resolution = WorkoutCatalog::builtin()?
            .resolve("a cardio and yoga session")
            .ok_or("no match")?;
        assert_eq!(resolution.entries.len(), 2);
        assert!(
            resolution
                .entries
                .iter()
                .all(|e| matches!(e, CategoryEntry::Filter(_)))
        );
        Ok(())
    }

    #[test]
    fn aliases_of_one_filter_are_deduplicated() -> TestResult {
        let resolution = WorkoutCatalog::builtin()?
            .resolve("cardio and cardiovascular")
            .ok_or("no match")?;
        assert_eq!(resolution.tokens, ["cardio", "cardiovascular"]);
        assert_eq!(resolution.entries.len(), 1);
        assert!(matches!(
            resolution.spec(),
            BodyPartSpec::Single(CategoryEntry::Filter(_))
        ));
        Ok(())
    }

    #[test]
    fn hiit_legs_sets_interval_mode() -> TestResult {
        let text = "Give me a HIIT workout for legs.".to_lowercase();
        let resolution = WorkoutCatalog::builtin()?
            .resolve(&text)
            .ok_or("no match")?;

        assert_eq!(resolution.tokens, ["legs", "hiit"]);
        assert!(resolution.is_hiit);
        assert_eq!(resolution.label(), "legs and hiit");

        let request = resolution.request();
        assert!(request.category_ids.contains(&9));
        assert_eq!(
            request.category_ids,
            ALL_CATEGORIES.into_iter().collect::<BTreeSet<_>>()
        );
        assert_eq!(request.equipment, Some(BODYWEIGHT_EQUIPMENT));
        assert!(request.keywords.iter().any(|k| k == "burpee"));
        Ok(())
    }

    #[test]
    fn matching_is_case_insensitive_and_whole_word() -> TestResult {
        let catalog = WorkoutCatalog::builtin()?;
        assert!(catalog.resolve("UPPERBODY blast").is_some());
        assert!(catalog.resolve("give me a pilates routine").is_none());
        assert!(catalog.resolve("backpack hiking").is_none());
        assert!(catalog.resolve("").is_none());
        Ok(())
    }

    #[test]
    fn full_body_expands_to_every_category() -> TestResult {
        let request = WorkoutCatalog::builtin()?
            .resolve("full body please")
            .ok_or("no match")?
            .request();
        assert_eq!(request.category_ids.len(), ALL_CATEGORIES.len());
        assert!(request.keywords.is_empty());
        Ok(())
    }

    #[test]
    fn morning_sets_morning_mode() -> TestResult {
        let resolution = WorkoutCatalog::builtin()?
            .resolve("a quick morning routine")
            .ok_or("no match")?;
        assert!(resolution.is_morning);
        assert!(!resolution.is_hiit);
        Ok(())
    }

    #[test]
    fn resolution_is_idempotent() -> TestResult {
        let catalog = WorkoutCatalog::builtin()?;
        let text = "upperbody, cardio and abs";
        let first = catalog.resolve(text);
        let second = catalog.resolve(text);
        assert!(first.is_some());
        assert_eq!(first, second);
        Ok(())
    }
}
