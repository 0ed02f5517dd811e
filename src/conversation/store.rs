//! In-memory conversation store keyed by user id.

use std::collections::VecDeque;

use dashmap::DashMap;

use super::turn::ConversationTurn;

/// Number of turns retained per user; older turns are evicted first.
pub const MAX_HISTORY_TURNS: usize = 20;

/// Thread-safe, bounded conversation log per user.
///
/// Appends for one user id are serialized by the map shard lock, so turns are
/// kept in the order the store receives them.
pub struct ConversationStore {
    logs: DashMap<String, VecDeque<ConversationTurn>>,
    capacity: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// Create an empty store retaining [`MAX_HISTORY_TURNS`] per user.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_TURNS)
    }

    /// Create an empty store retaining `capacity` turns per user.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            logs: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Chronological history for `user_id`; empty for unknown ids.
    #[must_use]
    pub fn history(&self, user_id: &str) -> Vec<ConversationTurn> {
        self.logs
            .get(user_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Append a turn, creating the log on first use and trimming the oldest
    /// turns beyond capacity.
    pub fn append(&self, user_id: &str, turn: ConversationTurn) {
        let mut log = self.logs.entry(user_id.to_string()).or_default();
        log.push_back(turn);
        while log.len() > self.capacity {
            log.pop_front();
        }
    }

    /// Drop the whole log for `user_id`. No-op when absent.
    pub fn clear(&self, user_id: &str) {
        self.logs.remove(user_id);
    }
}
