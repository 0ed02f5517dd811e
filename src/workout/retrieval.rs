//! Exercise retrieval with strict and relaxed filter tiers.

use std::collections::HashMap;
use std::fmt;

use futures::future::try_join_all;
use thiserror::Error;
use tracing::{error, warn};

use crate::providers::{ExerciseProvider, ExerciseQuery, ExerciseRecord, ProviderError, ProviderResult};

use super::request::NormalizedWorkoutRequest;
use super::session::{Exercise, SessionEntry, TrainingMode, assemble_session};

/// Minimum number of candidates a tier must produce to build a session.
pub const MIN_EXERCISES: usize = 5;

/// Asset requirements applied to candidates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterTier {
    /// Images required, video-backed exercises excluded.
    Strict,
    /// Any match, no media fetched.
    Relaxed,
}

impl fmt::Display for FilterTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Relaxed => write!(f, "relaxed"),
        }
    }
}

/// Result of the two-tier retrieval.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RetrievalOutcome {
    /// At least [`MIN_EXERCISES`] candidates.
    Sufficient(Vec<Exercise>),
    /// Both tiers came up short.
    Insufficient {
        /// Candidates found by the last tier.
        available: usize,
    },
}

/// Failure to produce a provider-backed session.
#[derive(Debug, Error)]
pub enum WorkoutError {
    /// The request selects no category, equipment or keyword.
    #[error("Invalid bodyPart or workout type specification")]
    InvalidSpec,
    /// Both tiers returned too few exercises.
    #[error("Not enough exercises available for {0}.")]
    NotEnough(String),
    /// The provider failed.
    #[error("Failed to fetch workouts for {what}")]
    Provider {
        /// What was asked for.
        what: String,
        /// Provider failure.
        source: ProviderError,
    },
}

/// Fetch candidates for `request` under one tier.
///
/// # Errors
/// Returns the first provider failure; it is logged with the tier.
pub async fn fetch_exercises(
    provider: &dyn ExerciseProvider,
    request: &NormalizedWorkoutRequest,
    tier: FilterTier,
) -> ProviderResult<Vec<Exercise>> {
    fetch_tier(provider, request, tier).await.inspect_err(|err| {
        error!(
            %tier,
            status = ?err.status(),
            body = err.body().unwrap_or_default(),
            "exercise retrieval failed: {err}"
        );
    })
}

async fn fetch_tier(
    provider: &dyn ExerciseProvider,
    request: &NormalizedWorkoutRequest,
    tier: FilterTier,
) -> ProviderResult<Vec<Exercise>> {
    let queries: Vec<ExerciseQuery> = if request.category_ids.is_empty() {
        vec![ExerciseQuery::any_category(request.equipment)]
    } else {
        request
            .category_ids
            .iter()
            .map(|id| ExerciseQuery::category(*id, request.equipment))
            .collect()
    };

    let pages = try_join_all(queries.iter().map(|query| provider.exercises(query))).await?;

    let matching = pages
        .into_iter()
        .flatten()
        .filter(|record| request.keywords.is_empty() || record.mentions_any(&request.keywords));
    let candidates = dedupe_by_id(matching);

    match tier {
        FilterTier::Relaxed => Ok(candidates
            .into_iter()
            .map(|record| Exercise::from_record(record, Vec::new()))
            .collect()),
        FilterTier::Strict => {
            let checked =
                try_join_all(candidates.into_iter().map(|record| with_images(provider, record)))
                    .await?;
            Ok(checked.into_iter().flatten().collect())
        }
    }
}

/// Keep the exercise only if it has images and no video.
async fn with_images(
    provider: &dyn ExerciseProvider,
    record: ExerciseRecord,
) -> ProviderResult<Option<Exercise>> {
    if provider.video_count(record.id).await? > 0 {
        return Ok(None);
    }

    let images = provider.image_urls(record.id).await?;
    if images.is_empty() {
        return Ok(None);
    }

    Ok(Some(Exercise::from_record(record, images)))
}

/// Deduplicate by id; a later record replaces an earlier one in place.
fn dedupe_by_id(records: impl IntoIterator<Item = ExerciseRecord>) -> Vec<ExerciseRecord> {
    let mut positions: HashMap<u64, usize> = HashMap::new();
    let mut unique: Vec<ExerciseRecord> = Vec::new();

    for record in records {
        if let Some(&idx) = positions.get(&record.id) {
            unique[idx] = record;
        } else {
            positions.insert(record.id, unique.len());
            unique.push(record);
        }
    }

    unique
}

/// Strict tier first, relaxed tier when strict yields too few.
///
/// # Errors
/// Returns the provider failure from whichever tier hit it.
pub async fn retrieve_exercises(
    provider: &dyn ExerciseProvider,
    request: &NormalizedWorkoutRequest,
) -> ProviderResult<RetrievalOutcome> {
    let strict = fetch_exercises(provider, request, FilterTier::Strict).await?;
    if strict.len() >= MIN_EXERCISES {
        return Ok(RetrievalOutcome::Sufficient(strict));
    }

    warn!(
        available = strict.len(),
        "not enough exercises with strict filters, trying relaxed filters"
    );

    let relaxed = fetch_exercises(provider, request, FilterTier::Relaxed).await?;
    if relaxed.len() >= MIN_EXERCISES {
        Ok(RetrievalOutcome::Sufficient(relaxed))
    } else {
        Ok(RetrievalOutcome::Insufficient {
            available: relaxed.len(),
        })
    }
}

/// Retrieve exercises and assemble a session.
///
/// # Errors
/// Returns [`WorkoutError::InvalidSpec`] for an empty request,
/// [`WorkoutError::NotEnough`] when both tiers fall short, and
/// [`WorkoutError::Provider`] when the provider fails.
pub async fn plan_session(
    provider: &dyn ExerciseProvider,
    request: &NormalizedWorkoutRequest,
) -> Result<Vec<SessionEntry>, WorkoutError> {
    if request.is_empty() {
        return Err(WorkoutError::InvalidSpec);
    }

    let outcome = retrieve_exercises(provider, request)
        .await
        .map_err(|source| WorkoutError::Provider {
            what: request.describe(),
            source,
        })?;

    match outcome {
        RetrievalOutcome::Sufficient(candidates) => {
            let mode = TrainingMode::from_flags(request.is_hiit, request.is_morning);
            Ok(assemble_session(candidates, mode, &mut rand::thread_rng()))
        }
        RetrievalOutcome::Insufficient { .. } => Err(WorkoutError::NotEnough(request.describe())),
    }
}
