//! Public leaderboard
//!
//! Built from the stored public entries, sorted by score descending.
//! Also decides the top-3 reward.

use serde::{Deserialize, Serialize};

use crate::persistence::LeaderboardEntry;

/// Rows shown on the ranking screen
pub const MAX_SHOWN: usize = 50;

/// Players needed before the top-3 reward is active
pub const REWARD_MIN_PLAYERS: usize = 100;

/// Places that qualify for the reward
pub const REWARD_PLACES: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sort descending by score; ties keep the stored order
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Self { entries }
    }

    pub fn player_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank of a user (1-indexed)
    pub fn rank_of(&self, user_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.user_id == user_id)
            .map(|i| i + 1)
    }

    pub fn is_top3(&self, user_id: &str) -> bool {
        self.rank_of(user_id)
            .map(|r| r <= REWARD_PLACES)
            .unwrap_or(false)
    }

    /// The reward only pays out once the board is big enough
    pub fn reward_active(&self, user_id: &str) -> bool {
        self.player_count() >= REWARD_MIN_PLAYERS && self.is_top3(user_id)
    }

    pub fn top(&self) -> &[LeaderboardEntry] {
        &self.entries[..self.entries.len().min(MAX_SHOWN)]
    }
}
