//! crates/sanctuary_core/src/assessments.rs
//!
//! Append-only collection of saved assessments. All users' assessments share
//! one stored collection; every read filters by owner.

use crate::domain::Assessment;
use crate::ports::{KeyValueStore, PortResult};
use crate::storage::{load_collection, load_collection_for_update, save_json, StorageKeys};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct AssessmentStore {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl AssessmentStore {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    async fn all(&self) -> Vec<Assessment> {
        load_collection(self.store.as_ref(), &self.keys.assessments).await
    }

    /// Assessments owned by `user_email`, in the order they were saved.
    pub async fn list(&self, user_email: &str) -> Vec<Assessment> {
        self.all()
            .await
            .into_iter()
            .filter(|a| a.user_email == user_email)
            .collect()
    }

    /// Looks up one assessment, scoped to its owner.
    pub async fn find(&self, user_email: &str, id: u64) -> Option<Assessment> {
        self.all()
            .await
            .into_iter()
            .find(|a| a.id == id && a.user_email == user_email)
    }

    /// A time-derived id that is strictly greater than every stored id.
    pub async fn next_id(&self, now: DateTime<Utc>) -> PortResult<u64> {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let stored: Vec<Assessment> =
            load_collection_for_update(self.store.as_ref(), &self.keys.assessments).await?;
        Ok(match stored.iter().map(|a| a.id).max() {
            Some(last) if last >= millis => last + 1,
            _ => millis,
        })
    }

    /// Adds one assessment to the stored collection. Earlier entries are
    /// written back untouched; if the collection cannot be read nothing is
    /// written.
    pub async fn append(&self, assessment: Assessment) -> PortResult<()> {
        let mut all: Vec<Assessment> =
            load_collection_for_update(self.store.as_ref(), &self.keys.assessments).await?;
        debug!(
            "Appending assessment {} for {} ({} already stored)",
            assessment.id,
            assessment.user_email,
            all.len()
        );
        all.push(assessment);
        save_json(self.store.as_ref(), &self.keys.assessments, &all).await
    }
}
