//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use sanctuary_core::{PhotoAnalysisService, RoomId, Workspace};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The service drives a single operator's workspace, so every request goes
/// through the one `workspace` lock and store writes never interleave.
pub struct AppState {
    pub workspace: Mutex<Workspace>,
    pub config: Arc<Config>,
    pub photo_analyzer: Arc<dyn PhotoAnalysisService>,
    /// One token per room with a pending photo analysis.
    pub pending_analyses: std::sync::Mutex<HashMap<RoomId, CancellationToken>>,
}

impl AppState {
    pub fn new(
        workspace: Workspace,
        config: Arc<Config>,
        photo_analyzer: Arc<dyn PhotoAnalysisService>,
    ) -> Self {
        Self {
            workspace: Mutex::new(workspace),
            config,
            photo_analyzer,
            pending_analyses: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Registers a fresh token for `room_id`, cancelling any analysis already
    /// pending for that room.
    pub fn track_analysis(&self, room_id: RoomId) -> CancellationToken {
        let token = CancellationToken::new();
        let mut pending = self
            .pending_analyses
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.insert(room_id, token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Forgets the token for `room_id` if it is still the current one, then
    /// retires it so repeated calls are no-ops.
    ///
    /// A replaced token is always cancelled first, so a live token is the
    /// current entry.
    pub fn finish_analysis(&self, room_id: RoomId, token: &CancellationToken) {
        let mut pending = self
            .pending_analyses
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !token.is_cancelled() {
            pending.remove(&room_id);
            token.cancel();
        }
    }

    pub fn pending_analysis_count(&self) -> usize {
        self.pending_analyses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn cancel_analysis(&self, room_id: RoomId) {
        let mut pending = self
            .pending_analyses
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = pending.remove(&room_id) {
            token.cancel();
        }
    }

    /// Cancels everything pending. Used whenever the form is reset.
    pub fn cancel_all_analyses(&self) {
        let mut pending = self
            .pending_analyses
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, token) in pending.drain() {
            token.cancel();
        }
    }
}
