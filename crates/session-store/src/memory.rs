//! In-memory session store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{DeviceId, SessionId};
use domain::{RepositoryError, Session, SessionRepository, SessionStatus};
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreState {
    // Rows are stored in their serialized form so every load goes
    // through the same round-trip as the real persistence adapter.
    rows: HashMap<SessionId, serde_json::Value>,
    fail_on_save: bool,
}

/// In-memory session repository for testing and default wiring.
///
/// Upserts are keyed by session id with last-writer-wins semantics,
/// matching the contract the core expects from the real store.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemorySessionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    pub async fn session_count(&self) -> usize {
        self.state.read().await.rows.len()
    }

    /// Configures the store to fail the next save calls.
    pub async fn set_fail_on_save(&self, fail: bool) {
        self.state.write().await.fail_on_save = fail;
    }

    /// Clears all stored sessions.
    pub async fn clear(&self) {
        self.state.write().await.rows.clear();
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn save(&self, session: &Session) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.fail_on_save {
            return Err(RepositoryError::Storage(
                "simulated storage failure".to_string(),
            ));
        }

        let row = serde_json::to_value(session)?;
        state.rows.insert(session.id(), row);
        Ok(())
    }

    async fn find_by_id(&self, id: SessionId) -> Result<Option<Session>, RepositoryError> {
        let state = self.state.read().await;
        match state.rows.get(&id) {
            Some(row) => Ok(Some(serde_json::from_value(row.clone())?)),
            None => Ok(None),
        }
    }

    async fn find_active_by_device(
        &self,
        device_id: DeviceId,
    ) -> Result<Option<Session>, RepositoryError> {
        let state = self.state.read().await;
        let mut newest: Option<Session> = None;
        for row in state.rows.values() {
            let session: Session = serde_json::from_value(row.clone())?;
            if session.device_id() != device_id || session.status() != SessionStatus::Active {
                continue;
            }
            let is_newer = newest
                .as_ref()
                .is_none_or(|best| session.created_at() > best.created_at());
            if is_newer {
                newest = Some(session);
            }
        }
        Ok(newest)
    }
}
