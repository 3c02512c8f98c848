//! Profile, stats and leaderboard persistence
//!
//! The game talks to an external key-value document store. Writes merge
//! field-by-field into the existing document (last writer wins), and nothing
//! is read back while a run is being simulated.
//!
//! Features:
//! - Typed records for the three documents
//! - `DocumentStore` backend trait (in-memory; LocalStorage on web)
//! - `ProgressStore` operations built on top with merge semantics

pub mod memory;
pub mod records;

pub use memory::MemoryStore;
pub use records::{LeaderboardEntry, ProfileRecord, StatsRecord, StatsUpdate};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("profile name is empty")]
    EmptyName,
}

/// Raw JSON document backend, keyed by path
pub trait DocumentStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError>;
    fn put(&mut self, key: &str, doc: Value) -> Result<(), PersistError>;
    /// All documents under a key prefix
    fn list(&self, prefix: &str) -> Result<Vec<Value>, PersistError>;
}

/// Shallow merge: top-level fields of `update` overwrite those of `base`
pub fn merge_json(base: &mut Value, update: Value) {
    match (base, update) {
        (Value::Object(base), Value::Object(update)) => {
            for (k, v) in update {
                base.insert(k, v);
            }
        }
        (base, update) => *base = update,
    }
}

fn profile_key(user_id: &str) -> String {
    format!("users/{user_id}/profile/data")
}

fn stats_key(user_id: &str) -> String {
    format!("users/{user_id}/profile/stats")
}

const LEADERBOARD_PREFIX: &str = "public/leaderboard/";

fn leaderboard_key(user_id: &str) -> String {
    format!("{}{}", LEADERBOARD_PREFIX, user_id)
}

/// Game-level persistence operations for any document backend
pub trait ProgressStore {
    fn load_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, PersistError>;
    fn save_profile(&mut self, user_id: &str, profile: &ProfileRecord, score: u64, level: u32) -> Result<(), PersistError>;
    fn load_stats(&self, user_id: &str) -> Result<Option<StatsRecord>, PersistError>;
    fn sync_progress(&mut self, user_id: &str, update: &StatsUpdate) -> Result<(), PersistError>;
    fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, PersistError>;
}

fn read<T: DeserializeOwned>(store: &impl DocumentStore, key: &str) -> Result<Option<T>, PersistError> {
    store
        .get(key)?
        .map(serde_json::from_value)
        .transpose()
        .map_err(PersistError::from)
}

fn merge_into<T: Serialize>(store: &mut impl DocumentStore, key: &str, update: &T) -> Result<(), PersistError> {
    let update = serde_json::to_value(update)?;
    let mut doc = store.get(key)?.unwrap_or(Value::Object(Default::default()));
    merge_json(&mut doc, update);
    store.put(key, doc)
}

impl<D: DocumentStore> ProgressStore for D {
    fn load_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, PersistError> {
        read(self, &profile_key(user_id))
    }

    /// Write the profile and seed the public leaderboard entry
    fn save_profile(&mut self, user_id: &str, profile: &ProfileRecord, score: u64, level: u32) -> Result<(), PersistError> {
        if profile.name.trim().is_empty() {
            return Err(PersistError::EmptyName);
        }
        let doc = serde_json::to_value(profile)?;
        self.put(&profile_key(user_id), doc)?;

        let entry = LeaderboardEntry {
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            score,
            level,
            user_id: user_id.to_string(),
        };
        merge_into(self, &leaderboard_key(user_id), &entry)
    }

    fn load_stats(&self, user_id: &str) -> Result<Option<StatsRecord>, PersistError> {
        read(self, &stats_key(user_id))
    }

    /// Merge stats (keeping the best level ever stored) and the public
    /// `{score, level}` pair
    fn sync_progress(&mut self, user_id: &str, update: &StatsUpdate) -> Result<(), PersistError> {
        let stored_max = self
            .load_stats(user_id)?
            .map(|s| s.max_level)
            .unwrap_or(0);
        let stats = StatsRecord {
            max_level: stored_max.max(update.max_level).max(update.current_level),
            coins: update.coins,
            score: update.score,
            lives: update.lives,
            echoes: update.echoes,
        };
        merge_into(self, &stats_key(user_id), &stats)?;

        let public = serde_json::json!({
            "score": update.score,
            "level": update.current_level + 1,
            "user_id": user_id,
        });
        merge_into(self, &leaderboard_key(user_id), &public)
    }

    fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, PersistError> {
        self.list(LEADERBOARD_PREFIX)?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(PersistError::from))
            .collect()
    }
}
