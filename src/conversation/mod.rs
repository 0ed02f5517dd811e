//! Per-user conversation history.
//!
//! The store keeps a bounded, chronological log of turns for every caller
//! supplied user id. Logs live for the lifetime of the process.

pub mod store;
pub mod turn;

pub use store::{ConversationStore, MAX_HISTORY_TURNS};
pub use turn::{ConversationTurn, TurnRole};
