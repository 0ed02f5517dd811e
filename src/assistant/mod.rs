//! Chat assistant: intent classification and routing.
//!
//! [`Assistant::respond`] reads the user's history, classifies the question,
//! records the question, then answers through one of three paths:
//! - meal: recipe retrieval.
//! - workout: category resolution, exercise retrieval, generated fallback.
//! - general: a short model-written answer.
//!
//! Every successful path records an assistant turn before returning.

pub mod error;
pub mod intent;
pub mod router;

pub use error::AssistantError;
pub use intent::{Intent, classification_prompt, classify, general_prompt};
pub use router::{Assistant, AssistantReply, GUEST_USER, WorkoutPlan};
