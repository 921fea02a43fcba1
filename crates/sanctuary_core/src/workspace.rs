//! crates/sanctuary_core/src/workspace.rs
//!
//! The application state for one operator: the active session, that user's
//! cached history and the working form. Created once at startup and passed
//! to whatever front end drives it.

use crate::assessments::AssessmentStore;
use crate::credentials::{AuthError, CredentialStore};
use crate::domain::{Assessment, AssessmentStatus, Session, User};
use crate::form::AssessmentForm;
use crate::ports::{KeyValueStore, PortError};
use crate::recommendations::generate_recommendations;
use crate::session::SessionStore;
use crate::storage::StorageKeys;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("No user is logged in")]
    NotAuthenticated,
    #[error(transparent)]
    Storage(#[from] PortError),
}

pub struct Workspace {
    credentials: CredentialStore,
    sessions: SessionStore,
    assessments: AssessmentStore,
    session: Option<Session>,
    history: Vec<Assessment>,
    pub form: AssessmentForm,
}

impl Workspace {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys, today: NaiveDate) -> Self {
        Self {
            credentials: CredentialStore::new(store.clone(), keys.clone()),
            sessions: SessionStore::new(store.clone(), keys.clone()),
            assessments: AssessmentStore::new(store, keys),
            session: None,
            history: Vec::new(),
            form: AssessmentForm::new("", today),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The active user's assessments as of the last load.
    pub fn history(&self) -> &[Assessment] {
        &self.history
    }

    /// Re-activates a persisted session, if there is one, and loads its history.
    pub async fn restore(&mut self, today: NaiveDate) -> Option<&Session> {
        let session = self.sessions.restore().await?;
        info!("Restored session for {}", session.email);
        self.activate(session, today).await;
        self.session.as_ref()
    }

    pub async fn signup(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
        today: NaiveDate,
    ) -> Result<User, AuthError> {
        let user = self.credentials.register(email, password, name).await?;
        self.activate(user.clone(), today).await;
        Ok(user)
    }

    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        today: NaiveDate,
    ) -> Result<User, AuthError> {
        let user = self.credentials.authenticate(email, password).await?;
        self.activate(user.clone(), today).await;
        Ok(user)
    }

    /// Clears the session (in memory and persisted), the cached history and
    /// the form.
    pub async fn logout(&mut self, today: NaiveDate) -> Result<(), WorkspaceError> {
        self.sessions.clear().await?;
        if let Some(session) = self.session.take() {
            info!("User {} logged out", session.email);
        }
        self.history.clear();
        self.form.reset("", today);
        Ok(())
    }

    /// Saves the current form as a new assessment owned by the active user.
    ///
    /// Recommendations are computed here, once, from the rooms as they are
    /// now. On success the history is reloaded and the form reset.
    pub async fn save(
        &mut self,
        status: AssessmentStatus,
        now: DateTime<Utc>,
    ) -> Result<Assessment, WorkspaceError> {
        let user_email = self
            .session
            .as_ref()
            .map(|s| s.email.clone())
            .ok_or(WorkspaceError::NotAuthenticated)?;

        let rooms = self.form.room_records();
        let assessment = Assessment {
            id: self.assessments.next_id(now).await?,
            status,
            property: self.form.property.clone(),
            recommendations: generate_recommendations(&rooms),
            rooms,
            user_email,
            created_at: Assessment::timestamp(now),
        };

        self.assessments.append(assessment.clone()).await?;
        info!(
            "Saved {} assessment {} with {} recommendation(s)",
            assessment.status,
            assessment.id,
            assessment.recommendations.len()
        );

        self.reload_history().await;
        self.reset_form(now.date_naive());
        Ok(assessment)
    }

    /// One of the active user's assessments, read fresh from the store.
    pub async fn assessment(&self, id: u64) -> Result<Option<Assessment>, WorkspaceError> {
        let session = self.session.as_ref().ok_or(WorkspaceError::NotAuthenticated)?;
        Ok(self.assessments.find(&session.email, id).await)
    }

    /// What the recommendations would be if the form were saved now.
    pub fn preview_recommendations(&self) -> Vec<String> {
        generate_recommendations(&self.form.room_records())
    }

    pub async fn reload_history(&mut self) {
        self.history = match &self.session {
            Some(session) => self.assessments.list(&session.email).await,
            None => Vec::new(),
        };
    }

    pub fn reset_form(&mut self, today: NaiveDate) {
        let assessor = self.session.as_ref().map(|s| s.name.as_str()).unwrap_or("");
        self.form = AssessmentForm::new(assessor, today);
    }

    async fn activate(&mut self, session: Session, today: NaiveDate) {
        self.session = Some(session);
        self.reload_history().await;
        self.reset_form(today);
    }
}
