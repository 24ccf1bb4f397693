//! Session aggregate implementation.

use chrono::{DateTime, Duration, Utc};
use common::{DeviceId, SessionId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{Currency, DetectedItem, Money, Weight};

use super::{SessionEvent, SessionStatus};

/// Session aggregate root.
///
/// Tracks one customer interaction from QR-code scan to confirmation or
/// cancellation. The aggregate is loaded as an owned value per request,
/// mutated, persisted, and discarded; it never shares live references
/// with other subsystems.
///
/// Events accumulate in an internal buffer and are drained exactly once
/// via [`Session::take_events`] by the orchestrator after a successful
/// save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    device_id: DeviceId,
    user_id: Option<String>,
    status: SessionStatus,
    items: Vec<DetectedItem>,
    total_weight: Weight,
    total_amount: Money,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    pending_events: Vec<SessionEvent>,
}

impl Session {
    /// Opens a new session for a device.
    ///
    /// Fails if the device id is the nil sentinel. The session starts
    /// active with an empty item list and expires `expiration_minutes`
    /// after creation.
    pub fn new(
        device_id: DeviceId,
        user_id: Option<String>,
        expiration_minutes: i64,
    ) -> Result<Self, DomainError> {
        if device_id.is_nil() {
            return Err(DomainError::DeviceIdRequired);
        }

        let now = Utc::now();
        let id = SessionId::new();
        let mut session = Self {
            id,
            device_id,
            user_id: user_id.clone(),
            status: SessionStatus::Active,
            items: Vec::new(),
            total_weight: Weight::zero(),
            total_amount: Money::zero(Currency::USD),
            created_at: now,
            expires_at: now + Duration::minutes(expiration_minutes),
            completed_at: None,
            pending_events: Vec::new(),
        };

        session
            .pending_events
            .push(SessionEvent::session_started(id, device_id, user_id));

        Ok(session)
    }

    // Query methods

    /// Returns the session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the device this session is bound to.
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    /// Returns the user who opened the session, if known.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the currently reconciled items.
    pub fn items(&self) -> &[DetectedItem] {
        &self.items
    }

    /// Returns true if at least one item has been detected.
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Returns the last measured total weight.
    pub fn total_weight(&self) -> Weight {
        self.total_weight
    }

    /// Returns the running total, always the sum of current item prices.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns when the session was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the session expires.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns when the session reached a terminal state, if it has.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns true if the session is active and inside its window.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active && Utc::now() < self.expires_at
    }

    /// Returns true if the expiry window has lapsed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    // Business methods

    /// Records the device's latest detection snapshot.
    ///
    /// The item list is replaced wholesale: each submission is a full
    /// re-scan of the scale's contents, not a delta. The running total
    /// is recomputed as the currency-checked sum of unit prices.
    ///
    /// If the expiry window lapsed while the session was still marked
    /// active, the session transitions to `Expired` here and the call
    /// fails with [`DomainError::SessionExpired`]. Expiry is only ever
    /// detected on this write path; there is no background timer.
    pub fn record_detection(
        &mut self,
        items: Vec<DetectedItem>,
        total_weight: Weight,
    ) -> Result<(), DomainError> {
        if self.status == SessionStatus::Active && self.is_expired() {
            self.status = SessionStatus::Expired;
            return Err(DomainError::SessionExpired);
        }
        if self.status != SessionStatus::Active {
            return Err(DomainError::SessionNotActive {
                status: self.status,
            });
        }

        // Reject mixed currencies before touching any state.
        let total = Self::sum_prices(&items)?;

        self.items = items;
        self.total_weight = total_weight;
        self.total_amount = total;

        self.pending_events.push(SessionEvent::items_detected(
            self.id,
            self.items.len(),
            total_weight.grams(),
        ));

        Ok(())
    }

    /// Confirms the purchase after payment.
    ///
    /// Requires an active session with at least one detected item.
    pub fn confirm(&mut self, payment_ref: impl Into<String>) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(DomainError::SessionNotActive {
                status: self.status,
            });
        }
        if self.items.is_empty() {
            return Err(DomainError::NoItemsDetected);
        }

        self.status = SessionStatus::Completed;
        self.completed_at = Some(Utc::now());

        self.pending_events
            .push(SessionEvent::session_completed(self.id, payment_ref));

        Ok(())
    }

    /// Cancels the session.
    ///
    /// Forbidden only once completed; any other state (including an
    /// already-cancelled or expired session) transitions to `Cancelled`
    /// and re-emits the event.
    pub fn cancel(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        if self.status == SessionStatus::Completed {
            return Err(DomainError::SessionAlreadyCompleted);
        }

        self.status = SessionStatus::Cancelled;
        self.completed_at = Some(Utc::now());

        self.pending_events
            .push(SessionEvent::session_cancelled(self.id, reason));

        Ok(())
    }

    /// Drains the buffered domain events.
    ///
    /// Called by the orchestrator after a successful save; the buffer
    /// is cleared so events are published exactly once.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn sum_prices(items: &[DetectedItem]) -> Result<Money, DomainError> {
        let mut iter = items.iter();
        let Some(first) = iter.next() else {
            return Ok(Money::zero(Currency::USD));
        };
        let mut total = first.unit_price;
        for item in iter {
            total = total.add(item.unit_price)?;
        }
        Ok(total)
    }
}
