//! Stored document shapes

use serde::{Deserialize, Serialize};

use crate::sim::GameState;

/// Avatar references offered during profile setup
pub const DEFAULT_AVATARS: [&str; 4] = [
    "https://api.dicebear.com/7.x/avataaars/svg?seed=Felix",
    "https://api.dicebear.com/7.x/avataaars/svg?seed=Aneka",
    "https://api.dicebear.com/7.x/avataaars/svg?seed=Milo",
    "https://api.dicebear.com/7.x/avataaars/svg?seed=Zoe",
];

/// Private profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub avatar: String,
}

impl ProfileRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: DEFAULT_AVATARS[0].to_string(),
        }
    }
}

/// Private stats
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsRecord {
    /// Furthest stage reached (0-based)
    pub max_level: u32,
    pub coins: u32,
    pub score: u64,
    pub lives: u32,
    pub echoes: u32,
}

/// Public leaderboard entry. Level is 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardEntry {
    pub name: String,
    pub avatar: String,
    pub score: u64,
    pub level: u32,
    pub user_id: String,
}

/// Progress pushed at checkpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsUpdate {
    pub current_level: u32,
    pub max_level: u32,
    pub coins: u32,
    pub score: u64,
    pub lives: u32,
    pub echoes: u32,
}

impl From<&GameState> for StatsUpdate {
    fn from(state: &GameState) -> Self {
        Self {
            current_level: state.level_index,
            max_level: state.max_level_reached,
            coins: state.player.coins,
            score: state.player.score,
            lives: state.player.lives,
            echoes: state.player.echoes,
        }
    }
}
