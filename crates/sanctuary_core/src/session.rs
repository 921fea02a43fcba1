//! crates/sanctuary_core/src/session.rs
//!
//! The persisted copy of the active login.

use crate::domain::Session;
use crate::ports::{KeyValueStore, PortResult};
use crate::storage::{load_json, save_json, StorageKeys};
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    /// Reads the persisted session, if any. Sessions never expire.
    pub async fn restore(&self) -> Option<Session> {
        load_json(self.store.as_ref(), &self.keys.current_user).await
    }

    pub async fn persist(&self, session: &Session) -> PortResult<()> {
        save_json(self.store.as_ref(), &self.keys.current_user, session).await
    }

    pub async fn clear(&self) -> PortResult<()> {
        self.store.remove(&self.keys.current_user).await
    }
}
