//! crates/sanctuary_core/src/credentials.rs
//!
//! Registered users, keyed by email. Owns the email uniqueness rule and the
//! exact-match credential check.

use crate::domain::User;
use crate::ports::{KeyValueStore, PortError};
use crate::session::SessionStore;
use crate::storage::{load_collection, load_collection_for_update, save_json, StorageKeys};
use std::sync::Arc;
use tracing::{info, warn};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid signup: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Storage(#[from] PortError),
}

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    sessions: SessionStore,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        let sessions = SessionStore::new(store.clone(), keys.clone());
        Self {
            store,
            keys,
            sessions,
        }
    }

    pub async fn users(&self) -> Vec<User> {
        load_collection(self.store.as_ref(), &self.keys.users).await
    }

    /// Adds a new user and makes it the persisted session.
    ///
    /// A blank `name` falls back to the email address. Once the user is stored
    /// the call succeeds even if the session could not be persisted.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::InvalidInput("email is required".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let mut users: Vec<User> =
            load_collection_for_update(self.store.as_ref(), &self.keys.users).await?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::DuplicateEmail);
        }

        let name = if name.trim().is_empty() { email } else { name };
        let user = User {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        users.push(user.clone());

        save_json(self.store.as_ref(), &self.keys.users, &users).await?;
        info!("Registered user {}", user.email);
        if let Err(e) = self.sessions.persist(&user).await {
            warn!("Could not persist the session for {}: {}", user.email, e);
        }
        Ok(user)
    }

    /// Finds the user matching both fields exactly and makes it the persisted
    /// session.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .users()
            .await
            .into_iter()
            .find(|u| u.email == email && u.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        self.sessions.persist(&user).await?;
        info!("User {} logged in", user.email);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::FlakyStore;
    use crate::storage::MemoryStore;

    fn credentials() -> (CredentialStore, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (CredentialStore::new(store.clone(), StorageKeys::default()), store)
    }

    #[tokio::test]
    async fn register_then_authenticate_returns_same_user() {
        let (creds, _) = credentials();
        let registered = creds.register("ana@example.com", "secret1", "Ana").await.unwrap();
        let authed = creds.authenticate("ana@example.com", "secret1").await.unwrap();
        assert_eq!(registered, authed);
    }

    #[tokio::test]
    async fn duplicate_email_leaves_existing_entry_unchanged() {
        let (creds, _) = credentials();
        creds.register("ana@example.com", "secret1", "Ana").await.unwrap();

        let err = creds
            .register("ana@example.com", "other-pass", "Impostor")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));

        let users = creds.users().await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ana");
        assert_eq!(users[0].password, "secret1");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (creds, _) = credentials();
        creds.register("ana@example.com", "secret1", "Ana").await.unwrap();
        let err = creds.authenticate("ana@example.com", "secret2").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn matching_is_case_sensitive() {
        let (creds, _) = credentials();
        creds.register("ana@example.com", "secret1", "Ana").await.unwrap();
        let err = creds.authenticate("Ana@Example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn blank_name_defaults_to_email() {
        let (creds, _) = credentials();
        let user = creds.register("bo@example.com", "secret1", "  ").await.unwrap();
        assert_eq!(user.name, "bo@example.com");
    }

    #[tokio::test]
    async fn short_password_and_missing_email_are_rejected() {
        let (creds, _) = credentials();
        assert!(matches!(
            creds.register("bo@example.com", "12345", "Bo").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            creds.register("", "secret1", "Bo").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(creds.users().await.is_empty());
    }

    #[tokio::test]
    async fn register_persists_the_session() {
        let (creds, store) = credentials();
        creds.register("ana@example.com", "secret1", "Ana").await.unwrap();
        let raw = store.get("sanctuary_current_user").await.unwrap().unwrap();
        let session: User = serde_json::from_str(&raw).unwrap();
        assert_eq!(session.email, "ana@example.com");
    }

    #[tokio::test]
    async fn failed_read_does_not_wipe_users_or_admit_duplicates() {
        let flaky = Arc::new(FlakyStore::default());
        let creds = CredentialStore::new(flaky.clone(), StorageKeys::default());
        creds.register("ana@example.com", "secret1", "Ana").await.unwrap();

        flaky.fail_next_get();
        let err = creds.register("bo@example.com", "secret2", "Bo").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(PortError::Unavailable(_))));
        let emails: Vec<String> = creds.users().await.into_iter().map(|u| u.email).collect();
        assert_eq!(emails, vec!["ana@example.com"]);

        creds.register("bo@example.com", "secret2", "Bo").await.unwrap();
        let err = creds.register("bo@example.com", "secret3", "Bo2").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        let users = creds.users().await;
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "Bo");
    }

    #[tokio::test]
    async fn register_succeeds_when_only_the_session_write_fails() {
        let store = Arc::new(SessionlessStore::default());
        let creds = CredentialStore::new(store.clone(), StorageKeys::default());
        let user = creds.register("ana@example.com", "secret1", "Ana").await.unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(creds.users().await, vec![user]);
        assert!(store.get("sanctuary_current_user").await.unwrap().is_none());
    }

    /// Rejects writes to the session key only.
    #[derive(Default)]
    struct SessionlessStore(MemoryStore);

    #[async_trait::async_trait]
    impl KeyValueStore for SessionlessStore {
        async fn get(&self, key: &str) -> crate::ports::PortResult<Option<String>> {
            self.0.get(key).await
        }
        async fn set(&self, key: &str, value: &str) -> crate::ports::PortResult<()> {
            if key.ends_with("current_user") {
                return Err(PortError::Unavailable("read-only".into()));
            }
            self.0.set(key, value).await
        }
        async fn remove(&self, key: &str) -> crate::ports::PortResult<()> {
            self.0.remove(key).await
        }
    }
}
