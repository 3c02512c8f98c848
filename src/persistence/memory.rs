//! In-process document store
//!
//! Used natively and in tests. Can be switched offline to exercise the
//! fire-and-forget failure path.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{DocumentStore, PersistError};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: BTreeMap<String, Value>,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `Unavailable`
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn check(&self) -> Result<(), PersistError> {
        if self.offline {
            Err(PersistError::Unavailable("memory store offline".into()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, PersistError> {
        self.check()?;
        Ok(self.docs.get(key).cloned())
    }

    fn put(&mut self, key: &str, doc: Value) -> Result<(), PersistError> {
        self.check()?;
        self.docs.insert(key.to_string(), doc);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<Value>, PersistError> {
        self.check()?;
        Ok(self
            .docs
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{ProfileRecord, ProgressStore, StatsUpdate};

    fn update(level: u32, score: u64) -> StatsUpdate {
        StatsUpdate {
            current_level: level,
            max_level: level,
            coins: 3,
            score,
            lives: 7,
            echoes: 12,
        }
    }

    #[test]
    fn profile_roundtrip_seeds_leaderboard() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load_profile("u1").unwrap(), None);
        store
            .save_profile("u1", &ProfileRecord::new("Ana"), 0, 1)
            .unwrap();
        assert_eq!(store.load_profile("u1").unwrap().unwrap().name, "Ana");
        let board = store.leaderboard().unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user_id, "u1");
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut store = MemoryStore::new();
        let err = store
            .save_profile("u1", &ProfileRecord::new("  "), 0, 1)
            .unwrap_err();
        assert!(matches!(err, PersistError::EmptyName));
        assert!(store.is_empty());
    }

    #[test]
    fn sync_merges_and_keeps_best_level() {
        let mut store = MemoryStore::new();
        store
            .save_profile("u1", &ProfileRecord::new("Ana"), 0, 1)
            .unwrap();
        store.sync_progress("u1", &update(12, 900)).unwrap();
        store.sync_progress("u1", &update(0, 1000)).unwrap();

        let stats = store.load_stats("u1").unwrap().unwrap();
        assert_eq!(stats.max_level, 12);
        assert_eq!(stats.score, 1000);

        let board = store.leaderboard().unwrap();
        assert_eq!(board[0].name, "Ana");
        assert_eq!(board[0].score, 1000);
        assert_eq!(board[0].level, 1);
    }

    #[test]
    fn offline_store_fails() {
        let mut store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.sync_progress("u1", &update(1, 1)),
            Err(PersistError::Unavailable(_))
        ));
    }

    #[test]
    fn list_respects_prefix() {
        let mut store = MemoryStore::new();
        store.put("public/leaderboard/a", Value::from(1)).unwrap();
        store.put("public/leaderboardx", Value::from(2)).unwrap();
        store.put("users/a", Value::from(3)).unwrap();
        assert_eq!(store.list("public/leaderboard/").unwrap().len(), 1);
    }
}
