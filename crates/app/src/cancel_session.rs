//! CancelSession use case.

use common::SessionId;
use domain::SessionRepository;

use crate::error::{AppError, Result};
use crate::ports::EventSink;
use crate::publish_events;

/// Command abandoning a session.
#[derive(Debug, Clone)]
pub struct CancelSession {
    pub session_id: SessionId,
    /// Free-form reason, recorded on the emitted event.
    pub reason: String,
}

/// Result of a cancelled session.
#[derive(Debug, Clone)]
pub struct CancelSessionResult {
    pub session_id: SessionId,
}

/// Orchestrates session cancellation.
pub struct CancelSessionHandler<R, E> {
    sessions: R,
    events: E,
}

impl<R, E> CancelSessionHandler<R, E>
where
    R: SessionRepository,
    E: EventSink,
{
    pub fn new(sessions: R, events: E) -> Self {
        Self { sessions, events }
    }

    /// Cancels the session. Fails only for completed sessions;
    /// re-cancelling is allowed and re-emits the event.
    #[tracing::instrument(skip(self, cmd), fields(session_id = %cmd.session_id))]
    pub async fn handle(&self, cmd: CancelSession) -> Result<CancelSessionResult> {
        let mut session = self
            .sessions
            .find_by_id(cmd.session_id)
            .await?
            .ok_or(AppError::SessionNotFound(cmd.session_id))?;

        session.cancel(cmd.reason)?;

        self.sessions.save(&session).await?;
        publish_events(&self.events, &mut session).await;

        metrics::counter!("sessions_cancelled_total").increment(1);
        tracing::info!(session_id = %session.id(), "session cancelled");

        Ok(CancelSessionResult {
            session_id: session.id(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::InMemoryEventSink;
    use common::{DeviceId, SkuId};
    use domain::{Currency, DetectedItem, DomainError, Money, Session, SessionStatus, Weight};
    use session_store::InMemorySessionStore;

    fn handler(
        store: &InMemorySessionStore,
        sink: &InMemoryEventSink,
    ) -> CancelSessionHandler<InMemorySessionStore, InMemoryEventSink> {
        CancelSessionHandler::new(store.clone(), sink.clone())
    }

    async fn seed_active(store: &InMemorySessionStore) -> SessionId {
        let mut session = Session::new(DeviceId::new(), None, 30).unwrap();
        session.take_events();
        store.save(&session).await.unwrap();
        session.id()
    }

    #[tokio::test]
    async fn cancel_transitions_and_publishes() {
        let store = InMemorySessionStore::new();
        let sink = InMemoryEventSink::new();
        let session_id = seed_active(&store).await;

        let result = handler(&store, &sink)
            .handle(CancelSession {
                session_id,
                reason: "customer walked away".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.session_id, session_id);
        let session = store.find_by_id(session_id).await.unwrap().unwrap();
        assert_eq!(session.status(), SessionStatus::Cancelled);

        assert_eq!(sink.published_count(), 1);
        assert_eq!(sink.published()[0].event_name(), "SessionCancelled");
    }

    #[tokio::test]
    async fn cancel_is_repeatable() {
        let store = InMemorySessionStore::new();
        let sink = InMemoryEventSink::new();
        let session_id = seed_active(&store).await;
        let handler = handler(&store, &sink);

        handler
            .handle(CancelSession {
                session_id,
                reason: "first".to_string(),
            })
            .await
            .unwrap();
        handler
            .handle(CancelSession {
                session_id,
                reason: "second".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(sink.published_count(), 2);
    }

    #[tokio::test]
    async fn cancel_completed_session_is_rejected() {
        let store = InMemorySessionStore::new();
        let sink = InMemoryEventSink::new();
        let mut session = Session::new(DeviceId::new(), None, 30).unwrap();
        let item = DetectedItem::new(
            SkuId::new(),
            "APPLE-001",
            "Fuji Apple",
            0.95,
            Money::new(250, Currency::USD).unwrap(),
        );
        session
            .record_detection(vec![item], Weight::new(150.0).unwrap())
            .unwrap();
        session.confirm("pay-123").unwrap();
        session.take_events();
        store.save(&session).await.unwrap();

        let result = handler(&store, &sink)
            .handle(CancelSession {
                session_id: session.id(),
                reason: "too late".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::SessionAlreadyCompleted))
        ));
        assert_eq!(sink.published_count(), 0);
    }

    #[tokio::test]
    async fn cancel_unknown_session_fails_not_found() {
        let store = InMemorySessionStore::new();
        let sink = InMemoryEventSink::new();

        let result = handler(&store, &sink)
            .handle(CancelSession {
                session_id: SessionId::new(),
                reason: "missing".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::SessionNotFound(_))));
    }
}
