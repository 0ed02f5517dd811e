//! Workout session assembly.
//!
//! A session is always: 3 curated warmups, up to 5 main exercises drawn from
//! retrieval, 3 curated cooldowns.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::providers::{ExerciseRecord, NamedRef};

/// Maximum number of main exercises in a session.
pub const MAIN_EXERCISES: usize = 5;
/// Warmups drawn per session.
pub const WARMUP_DRAWS: usize = 3;
/// Cooldowns drawn per session.
pub const COOLDOWN_DRAWS: usize = 3;

/// Exercise id: numeric for database exercises, textual for curated ones.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExerciseId {
    /// Exercise database id.
    Provider(u64),
    /// Curated id such as `cw1`.
    Curated(String),
}

/// Exercise as rendered to the client.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Provider or curated id.
    pub id: ExerciseId,
    /// Exercise name.
    pub name: String,
    /// Description text.
    pub description: String,
    /// Category id and name.
    pub category: NamedRef,
    /// Equipment names, comma-joined.
    pub equipment: String,
    /// Muscle names, comma-joined.
    pub muscles: String,
    /// Demonstration image URLs.
    pub images: Vec<String>,
}

impl Exercise {
    /// Shape a provider record, attaching `images`.
    #[must_use]
    pub fn from_record(record: ExerciseRecord, images: Vec<String>) -> Self {
        Self {
            id: ExerciseId::Provider(record.id),
            name: record.name,
            description: record.description,
            category: record.category,
            equipment: join_names(&record.equipment, "Bodyweight"),
            muscles: join_names(&record.muscles, "General"),
            images,
        }
    }
}

fn join_names(refs: &[NamedRef], fallback: &str) -> String {
    if refs.is_empty() {
        return fallback.to_string();
    }
    refs.iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Position of an entry within a session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Opening block.
    #[serde(alias = "Warmup", alias = "warm-up", alias = "Warm-up")]
    Warmup,
    /// Main block.
    #[serde(alias = "Main")]
    Main,
    /// Closing block.
    #[serde(alias = "Cooldown", alias = "cool-down", alias = "Cool-down")]
    Cooldown,
}

impl SessionType {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warmup => "warmup",
            Self::Main => "main",
            Self::Cooldown => "cooldown",
        }
    }
}

/// One session entry: an exercise plus its prescription.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    /// The exercise.
    #[serde(flatten)]
    pub exercise: Exercise,
    /// Block the entry belongs to.
    pub session_type: SessionType,
    /// Reps or timing.
    pub recommended_reps: String,
    /// Sets or rounds.
    pub recommended_sets: String,
}

/// Volume prescription applied to main exercises.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TrainingMode {
    /// Interval timing.
    Hiit,
    /// Lighter morning volume.
    Morning,
    /// Regular strength volume.
    #[default]
    Standard,
}

impl TrainingMode {
    /// Pick the mode from request flags; interval timing wins.
    #[must_use]
    pub const fn from_flags(is_hiit: bool, is_morning: bool) -> Self {
        if is_hiit {
            Self::Hiit
        } else if is_morning {
            Self::Morning
        } else {
            Self::Standard
        }
    }

    /// Reps or timing for main exercises.
    #[must_use]
    pub const fn reps(self) -> &'static str {
        match self {
            Self::Hiit => "20s work, 10s rest",
            Self::Morning => "8–10 reps",
            Self::Standard => "8–12 reps",
        }
    }

    /// Sets or rounds for main exercises.
    #[must_use]
    pub const fn sets(self) -> &'static str {
        match self {
            Self::Hiit => "4 rounds",
            Self::Morning => "2–3 sets",
            Self::Standard => "3–4 sets",
        }
    }
}

/// Build a session from retrieved candidates.
///
/// Candidates are shuffled and at most [`MAIN_EXERCISES`] are kept.
pub fn assemble_session<R: Rng + ?Sized>(
    mut candidates: Vec<Exercise>,
    mode: TrainingMode,
    rng: &mut R,
) -> Vec<SessionEntry> {
    candidates.shuffle(rng);
    candidates.truncate(MAIN_EXERCISES);

    let warmups = draw_curated(WARMUPS, WARMUP_DRAWS, SessionType::Warmup, rng);
    let cooldowns = draw_curated(COOLDOWNS, COOLDOWN_DRAWS, SessionType::Cooldown, rng);

    let mut session = Vec::with_capacity(warmups.len() + candidates.len() + cooldowns.len());
    session.extend(warmups);
    session.extend(candidates.into_iter().map(|exercise| SessionEntry {
        exercise,
        session_type: SessionType::Main,
        recommended_reps: mode.reps().to_string(),
        recommended_sets: mode.sets().to_string(),
    }));
    session.extend(cooldowns);
    session
}

/// Short summary of a session for the conversation log.
#[must_use]
pub fn summarize_session_types<I>(types: I) -> String
where
    I: IntoIterator<Item = SessionType>,
{
    let joined: Vec<&str> = types.into_iter().map(SessionType::as_str).collect();
    if joined.is_empty() {
        "Suggested workouts: No workouts found.".to_string()
    } else {
        format!("Suggested workouts: {}", joined.join(", "))
    }
}

struct CuratedExercise {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    muscles: &'static str,
    image: &'static str,
    reps: &'static str,
    sets: &'static str,
}

impl CuratedExercise {
    fn to_entry(&self, session_type: SessionType) -> SessionEntry {
        let category = match session_type {
            SessionType::Cooldown => "Cooldown",
            SessionType::Warmup | SessionType::Main => "Warmup",
        };
        SessionEntry {
            exercise: Exercise {
                id: ExerciseId::Curated(self.id.to_string()),
                name: self.name.to_string(),
                description: self.description.to_string(),
                category: NamedRef {
                    id: 0,
                    name: category.to_string(),
                },
                equipment: "Bodyweight".to_string(),
                muscles: self.muscles.to_string(),
                images: vec![self.image.to_string()],
            },
            session_type,
            recommended_reps: self.reps.to_string(),
            recommended_sets: self.sets.to_string(),
        }
    }
}

fn draw_curated<R: Rng + ?Sized>(
    pool: &[CuratedExercise],
    count: usize,
    session_type: SessionType,
    rng: &mut R,
) -> Vec<SessionEntry> {
    pool.choose_multiple(rng, count)
        .map(|item| item.to_entry(session_type))
        .collect()
}

const WARMUPS: &[CuratedExercise] = &[
    CuratedExercise {
        id: "cw1",
        name: "Jumping Jacks",
        description: "A full body warm-up exercise that increases heart rate.",
        muscles: "Full body",
        image: "https://cdn.dribbble.com/userupload/23995967/file/original-b7327e47be94975940e98b26277e5ead.gif",
        reps: "20–30 seconds",
        sets: "2 sets",
    },
    CuratedExercise {
        id: "cw2",
        name: "Arm Circles",
        description: "Loosens shoulder joints and improves blood flow.",
        muscles: "Shoulders",
        image: "https://static.vecteezy.com/system/resources/previews/006/417/754/non_2x/woman-doing-arm-circles-exercise-flat-illustration-isolated-on-white-background-free-vector.jpg",
        reps: "10 forward, 10 backward",
        sets: "2 sets",
    },
    CuratedExercise {
        id: "cw3",
        name: "High Knees",
        description: "Improves cardiovascular fitness and warms up the lower body.",
        muscles: "Legs, Core",
        image: "https://static.vecteezy.com/system/resources/previews/006/417/644/non_2x/woman-doing-high-knees-front-knee-lifts-run-jog-on-the-spot-exercise-flat-illustration-isolated-on-white-background-free-vector.jpg",
        reps: "30 seconds",
        sets: "2 sets",
    },
    CuratedExercise {
        id: "cw4",
        name: "Torso Twists",
        description: "Warms up the core and improves rotational flexibility.",
        muscles: "Obliques, Lower back",
        image: "https://osomnimedia.com/wp-content/uploads/2016/07/Upper-Torso-Twist-Stretch.jpg",
        reps: "15 reps each side",
        sets: "2 sets",
    },
    CuratedExercise {
        id: "cw5",
        name: "Leg Swings",
        description: "Activates hip flexors and hamstrings before lower body workouts.",
        muscles: "Hips, Hamstrings",
        image: "https://i.pinimg.com/originals/00/4c/8a/004c8a160dc5a419a3b456e2272c8453.gif",
        reps: "10 forward-backward, 10 side-to-side per leg",
        sets: "2 sets",
    },
];

const COOLDOWNS: &[CuratedExercise] = &[
    CuratedExercise {
        id: "cc1",
        name: "Standing Hamstring Stretch",
        description: "Relieves hamstring tightness after workouts.",
        muscles: "Hamstrings",
        image: "https://static.vecteezy.com/system/resources/previews/034/326/039/non_2x/man-doing-standing-hamstring-stretch-exercise-vector.jpg",
        reps: "15–20 seconds hold",
        sets: "2 sets",
    },
    CuratedExercise {
        id: "cc2",
        name: "Child’s Pose",
        description: "Stretches lower back and promotes relaxation.",
        muscles: "Lower back",
        image: "https://www.shutterstock.com/image-vector/woman-doing-childs-pose-stretch-600nw-2102646118.jpg",
        reps: "30 seconds hold",
        sets: "1–2 sets",
    },
    CuratedExercise {
        id: "cc3",
        name: "Seated Forward Bend",
        description: "Stretches the spine, shoulders, and hamstrings.",
        muscles: "Back, Hamstrings",
        image: "https://s2.gifyu.com/images/3-Seated-forward-bend.gif",
        reps: "30 seconds hold",
        sets: "1–2 sets",
    },
    CuratedExercise {
        id: "cc4",
        name: "Cat-Cow Stretch",
        description: "Improves flexibility and relieves tension in the spine.",
        muscles: "Spine, Core",
        image: "https://homeworkouts.org/wp-content/uploads/anim-cat-cow-pose.gif",
        reps: "10 slow cycles",
        sets: "2 sets",
    },
    CuratedExercise {
        id: "cc5",
        name: "Neck Rolls",
        description: "Relaxes neck muscles and reduces stiffness.",
        muscles: "Neck, Upper back",
        image: "https://www.spotebi.com/wp-content/uploads/2015/03/neck-rolls-exercise-illustration.gif",
        reps: "5 rolls each direction",
        sets: "2 sets",
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn candidate(id: u64) -> Exercise {
        Exercise::from_record(
            ExerciseRecord {
                id,
                name: format!("Exercise {id}"),
                ..ExerciseRecord::default()
            },
            Vec::new(),
        )
    }

    fn count(session: &[SessionEntry], kind: SessionType) -> usize {
        session.iter().filter(|e| e.session_type == kind).count()
    }

    #[test]
    fn session_shape_holds_for_any_candidate_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..=12 {
            let session = assemble_session(
                (0..n).map(candidate).collect(),
                TrainingMode::Standard,
                &mut rng,
            );
            let main = count(&session, SessionType::Main);

            assert!(session[..3].iter().all(|e| e.session_type == SessionType::Warmup));
            assert!(
                session[session.len() - 3..]
                    .iter()
                    .all(|e| e.session_type == SessionType::Cooldown)
            );
            assert_eq!(main, usize::try_from(n).unwrap_or(0).min(MAIN_EXERCISES));
            assert!((7..=11).contains(&session.len()));
        }
    }

    #[test]
    fn curated_draws_are_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        let session = assemble_session(vec![candidate(1)], TrainingMode::Standard, &mut rng);
        let ids: HashSet<&ExerciseId> = session.iter().map(|e| &e.exercise.id).collect();
        assert_eq!(ids.len(), session.len());
    }

    #[test]
    fn main_prescription_follows_mode() {
        let mut rng = StdRng::seed_from_u64(1);
        let cases = [
            (TrainingMode::from_flags(true, true), "20s work, 10s rest", "4 rounds"),
            (TrainingMode::from_flags(false, true), "8–10 reps", "2–3 sets"),
            (TrainingMode::from_flags(false, false), "8–12 reps", "3–4 sets"),
        ];
        for (mode, reps, sets) in cases {
            let session = assemble_session(vec![candidate(1)], mode, &mut rng);
            let main: Vec<_> = session
                .iter()
                .filter(|e| e.session_type == SessionType::Main)
                .collect();
            assert_eq!(main.len(), 1);
            assert_eq!(main[0].recommended_reps, reps);
            assert_eq!(main[0].recommended_sets, sets);
        }
    }

    #[test]
    fn record_shaping_uses_fallback_names() {
        let record = ExerciseRecord {
            id: 12,
            equipment: vec![
                NamedRef { id: 1, name: "Barbell".to_string() },
                NamedRef { id: 8, name: "Bench".to_string() },
            ],
            ..ExerciseRecord::default()
        };
        let exercise = Exercise::from_record(record, vec!["https://img/1.png".to_string()]);
        assert_eq!(exercise.id, ExerciseId::Provider(12));
        assert_eq!(exercise.equipment, "Barbell, Bench");
        assert_eq!(exercise.muscles, "General");
        assert_eq!(exercise.images.len(), 1);

        let bare = Exercise::from_record(ExerciseRecord::default(), Vec::new());
        assert_eq!(bare.equipment, "Bodyweight");
    }

    #[test]
    fn entry_serializes_flat_camel_case() -> Result<(), serde_json::Error> {
        let mut rng = StdRng::seed_from_u64(3);
        let session = assemble_session(vec![candidate(5)], TrainingMode::Standard, &mut rng);
        let json = serde_json::to_value(&session)?;
        assert_eq!(json[0]["sessionType"], "warmup");
        assert!(json[0]["recommendedReps"].is_string());
        assert!(json[3]["name"].is_string());
        assert_eq!(json[3]["sessionType"], "main");
        assert_eq!(json[3]["id"], 5);
        assert!(json[0]["id"].as_str().is_some_and(|id| id.starts_with("cw")));
        Ok(())
    }

    #[test]
    fn summary_lists_session_types() {
        let summary = summarize_session_types([SessionType::Warmup, SessionType::Main]);
        assert_eq!(summary, "Suggested workouts: warmup, main");
        assert_eq!(
            summarize_session_types(Vec::new()),
            "Suggested workouts: No workouts found."
        );
    }
}
