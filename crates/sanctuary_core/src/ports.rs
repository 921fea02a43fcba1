//! crates/sanctuary_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The core only talks to storage and to the photo analyser through these
//! traits; concrete implementations live in the service crate.

use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable string key-value storage.
///
/// Every write replaces the whole value stored under a key; callers do a
/// read-modify-write of full collections.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> PortResult<()>;
}

/// Produces the advisory text attached to a room after photos are added.
#[async_trait]
pub trait PhotoAnalysisService: Send + Sync {
    async fn analyze_photos(&self, room_name: &str, photo_names: &[String]) -> PortResult<String>;
}
