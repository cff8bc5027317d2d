//! Best-effort key-value persistence
//!
//! Features:
//! - `Store` trait injected into everything that persists
//! - In-memory backend (native, tests, and fallback when storage is blocked)
//! - LocalStorage backend on the web
//! - JSON helpers that log and swallow failures

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
mod local_storage;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Fixed storage keys
pub mod keys {
    pub const PROGRESS: &str = "echolocate_progress";
    pub const CHEATS: &str = "echolocate_cheats";
    pub const SETTINGS: &str = "echolocate_settings";
    pub const HIGH_SCORES: &str = "echolocate_highscores";
    pub const BOON_LOADOUT: &str = "echolocate_boon";
    pub const ROUND_SNAPSHOT: &str = "echolocate_round";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("failed to serialize value for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },
}

/// String key-value storage
pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str);
}

/// HashMap-backed store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value (used to simulate stale or corrupt saves)
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Load and decode `key`, returning `T::default()` when missing or malformed
pub fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: Store + ?Sized,
{
    load(store, key).unwrap_or_default()
}

/// Load and decode `key`; `None` when missing or malformed
pub fn load<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    let json = store.get(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding malformed {}: {}", key, e);
            None
        }
    }
}

/// Encode and store `value`; failures are logged and reported as `false`
pub fn save<T, S>(store: &mut S, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
    S: Store + ?Sized,
{
    let result = serde_json::to_string(value)
        .map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })
        .and_then(|json| store.set(key, &json));

    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Persistence failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        count: u32,
    }

    /// Backend that refuses every write
    struct BrokenStore;

    impl Store for BrokenStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            })
        }

        fn remove(&mut self, _key: &str) {}
    }

    #[test]
    fn test_missing_key_defaults() {
        let store = MemoryStore::new();
        let s: Sample = load_or_default(&store, "nope");
        assert_eq!(s, Sample::default());
    }

    #[test]
    fn test_malformed_json_defaults() {
        let mut store = MemoryStore::new();
        store.insert("k", "{not json");
        let s: Sample = load_or_default(&store, "k");
        assert_eq!(s, Sample::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        assert!(save(&mut store, "k", &Sample { count: 4 }));
        assert_eq!(load::<Sample, _>(&store, "k"), Some(Sample { count: 4 }));
        store.remove("k");
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let mut store = BrokenStore;
        assert!(!save(&mut store, "k", &Sample { count: 1 }));
    }
}
