//! crates/sanctuary_core/src/storage.rs
//!
//! Key naming and JSON (de)serialization of whole collections on top of a
//! [`KeyValueStore`], plus an in-memory store.

use crate::ports::{KeyValueStore, PortError, PortResult};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

pub const DEFAULT_PREFIX: &str = "sanctuary_";

/// The three logical keys, namespaced by a shared prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub users: String,
    pub current_user: String,
    pub assessments: String,
}

impl StorageKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            users: format!("{prefix}users"),
            current_user: format!("{prefix}current_user"),
            assessments: format!("{prefix}assessments"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}

/// Reads a JSON value, treating a missing key, an unreachable store and an
/// unparsable value all as "nothing stored".
pub(crate) async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Could not read '{}', treating it as empty: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Stored value under '{}' is unreadable, ignoring it: {}", key, e);
            None
        }
    }
}

/// Reads a JSON array, with the same leniency as [`load_json`].
pub(crate) async fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Vec<T> {
    load_json(store, key).await.unwrap_or_default()
}

/// Reads a JSON array that is about to be modified and written back.
///
/// Only an unparsable value reads as empty. A store error is returned, so a
/// failed read never turns into an overwrite of the stored collection.
pub(crate) async fn load_collection_for_update<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> PortResult<Vec<T>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(values) => Ok(values),
        Err(e) => {
            warn!("Stored value under '{}' is unreadable, replacing it: {}", key, e);
            Ok(Vec::new())
        }
    }
}

pub(crate) async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> PortResult<()> {
    let raw = serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
    store.set(key, &raw).await
}

//=========================================================================================
// In-memory store
//=========================================================================================

/// A `KeyValueStore` held in process memory. Used for tests and for runs
/// without a database configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A `MemoryStore` whose next `get` calls can be made to fail.
    #[derive(Default)]
    pub(crate) struct FlakyStore {
        inner: MemoryStore,
        failing_gets: AtomicUsize,
    }

    impl FlakyStore {
        pub(crate) fn fail_next_get(&self) {
            self.failing_gets.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> PortResult<Option<String>> {
            let failing = self
                .failing_gets
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(PortError::Unavailable("database is locked".into()));
            }
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: &str) -> PortResult<()> {
            self.inner.set(key, value).await
        }
        async fn remove(&self, key: &str) -> PortResult<()> {
            self.inner.remove(key).await
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> PortResult<Option<String>> {
            Err(PortError::Unavailable("disk gone".into()))
        }
        async fn set(&self, _key: &str, _value: &str) -> PortResult<()> {
            Err(PortError::Unavailable("disk gone".into()))
        }
        async fn remove(&self, _key: &str) -> PortResult<()> {
            Ok(())
        }
    }

    #[test]
    fn keys_are_prefixed() {
        let keys = StorageKeys::with_prefix("test_");
        assert_eq!(keys.users, "test_users");
        assert_eq!(keys.current_user, "test_current_user");
        assert_eq!(keys.assessments, "test_assessments");
    }

    #[tokio::test]
    async fn corrupt_collection_reads_as_empty() {
        let store = MemoryStore::new();
        store.set("items", "{not json").await.unwrap();
        let items: Vec<String> = load_collection(&store, "items").await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn unavailable_store_reads_as_empty() {
        let items: Vec<String> = load_collection(&BrokenStore, "items").await;
        assert!(items.is_empty());
        assert!(save_json(&BrokenStore, "items", &items).await.is_err());
    }

    #[tokio::test]
    async fn loading_for_update_surfaces_store_errors() {
        let result: PortResult<Vec<String>> =
            load_collection_for_update(&BrokenStore, "items").await;
        assert!(matches!(result, Err(PortError::Unavailable(_))));

        let store = MemoryStore::new();
        store.set("items", "{not json").await.unwrap();
        let items: Vec<String> = load_collection_for_update(&store, "items").await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn memory_store_round_trip_and_remove() {
        let store = MemoryStore::new();
        save_json(&store, "k", &vec![1, 2, 3]).await.unwrap();
        let back: Vec<i32> = load_collection(&store, "k").await;
        assert_eq!(back, vec![1, 2, 3]);
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
