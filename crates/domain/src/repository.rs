//! Session persistence port.

use async_trait::async_trait;
use common::{DeviceId, SessionId};
use thiserror::Error;

use crate::session::Session;

/// Errors surfaced by session repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The persisted representation could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence port for the session aggregate, owned by the domain.
///
/// `save` is an upsert keyed by session id; the store is the sole
/// serialization point for concurrent writers (last writer wins per
/// session id; the core does not implement optimistic locking).
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Inserts or overwrites the session.
    async fn save(&self, session: &Session) -> Result<(), RepositoryError>;

    /// Loads a session by id, or `None` if absent.
    async fn find_by_id(&self, id: SessionId) -> Result<Option<Session>, RepositoryError>;

    /// Finds the active session bound to a device, if any.
    async fn find_active_by_device(
        &self,
        device_id: DeviceId,
    ) -> Result<Option<Session>, RepositoryError>;
}
