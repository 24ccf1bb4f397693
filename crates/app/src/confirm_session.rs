//! ConfirmSession use case.

use chrono::{DateTime, Utc};
use common::SessionId;
use domain::SessionRepository;

use crate::error::{AppError, Result};
use crate::ports::EventSink;
use crate::publish_events;

/// Command confirming a purchase after payment succeeded.
#[derive(Debug, Clone)]
pub struct ConfirmSession {
    pub session_id: SessionId,
    /// Reference from the payment provider, recorded for audit.
    pub payment_ref: String,
}

/// Result of a confirmed session.
#[derive(Debug, Clone)]
pub struct ConfirmSessionResult {
    pub session_id: SessionId,
    pub total_minor: i64,
    pub currency: String,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Orchestrates session confirmation.
pub struct ConfirmSessionHandler<R, E> {
    sessions: R,
    events: E,
}

impl<R, E> ConfirmSessionHandler<R, E>
where
    R: SessionRepository,
    E: EventSink,
{
    pub fn new(sessions: R, events: E) -> Self {
        Self { sessions, events }
    }

    /// Completes the session, locking in the current item list and total.
    #[tracing::instrument(skip(self, cmd), fields(session_id = %cmd.session_id))]
    pub async fn handle(&self, cmd: ConfirmSession) -> Result<ConfirmSessionResult> {
        let mut session = self
            .sessions
            .find_by_id(cmd.session_id)
            .await?
            .ok_or(AppError::SessionNotFound(cmd.session_id))?;

        session.confirm(cmd.payment_ref)?;

        self.sessions.save(&session).await?;
        publish_events(&self.events, &mut session).await;

        metrics::counter!("sessions_completed_total").increment(1);
        tracing::info!(
            session_id = %session.id(),
            total = %session.total_amount(),
            "session confirmed"
        );

        Ok(ConfirmSessionResult {
            session_id: session.id(),
            total_minor: session.total_amount().minor_units(),
            currency: session.total_amount().currency().to_string(),
            completed_at: session.completed_at(),
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
    ) -> ConfirmSessionHandler<InMemorySessionStore, InMemoryEventSink> {
        ConfirmSessionHandler::new(store.clone(), sink.clone())
    }

    async fn seed_with_items(store: &InMemorySessionStore) -> SessionId {
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
        session.take_events();
        store.save(&session).await.unwrap();
        session.id()
    }

    #[tokio::test]
    async fn confirm_completes_the_session() {
        let store = InMemorySessionStore::new();
        let sink = InMemoryEventSink::new();
        let session_id = seed_with_items(&store).await;

        let result = handler(&store, &sink)
            .handle(ConfirmSession {
                session_id,
                payment_ref: "pay-123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.total_minor, 250);
        assert_eq!(result.currency, "USD");
        assert!(result.completed_at.is_some());

        let session = store.find_by_id(session_id).await.unwrap().unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);

        assert_eq!(sink.published_count(), 1);
        assert_eq!(sink.published()[0].event_name(), "SessionCompleted");
    }

    #[tokio::test]
    async fn confirm_without_items_is_rejected() {
        let store = InMemorySessionStore::new();
        let sink = InMemoryEventSink::new();
        let mut session = Session::new(DeviceId::new(), None, 30).unwrap();
        session.take_events();
        store.save(&session).await.unwrap();

        let result = handler(&store, &sink)
            .handle(ConfirmSession {
                session_id: session.id(),
                payment_ref: "pay-123".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::NoItemsDetected))
        ));
        assert_eq!(sink.published_count(), 0);
    }

    #[tokio::test]
    async fn confirm_unknown_session_fails_not_found() {
        let store = InMemorySessionStore::new();
        let sink = InMemoryEventSink::new();

        let result = handler(&store, &sink)
            .handle(ConfirmSession {
                session_id: SessionId::new(),
                payment_ref: "pay-123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn confirm_is_not_idempotent() {
        let store = InMemorySessionStore::new();
        let sink = InMemoryEventSink::new();
        let session_id = seed_with_items(&store).await;
        let handler = handler(&store, &sink);

        handler
            .handle(ConfirmSession {
                session_id,
                payment_ref: "pay-123".to_string(),
            })
            .await
            .unwrap();

        let second = handler
            .handle(ConfirmSession {
                session_id,
                payment_ref: "pay-456".to_string(),
            })
            .await;

        assert!(matches!(
            second,
            Err(AppError::Domain(DomainError::SessionNotActive { .. }))
        ));
        assert_eq!(sink.published_count(), 1);
    }

    #[tokio::test]
    async fn save_failure_aborts_before_publishing() {
        let store = InMemorySessionStore::new();
        let sink = InMemoryEventSink::new();
        let session_id = seed_with_items(&store).await;
        store.set_fail_on_save(true).await;

        let result = handler(&store, &sink)
            .handle(ConfirmSession {
                session_id,
                payment_ref: "pay-123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Repository(_))));
        assert_eq!(sink.published_count(), 0);
    }
}
