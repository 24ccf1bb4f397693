//! Session domain events.
//!
//! Events are immutable past-tense facts. The aggregate buffers them
//! internally; orchestrators drain and publish them after a successful
//! save, never the aggregate itself.

use chrono::{DateTime, Utc};
use common::{DeviceId, SessionId};
use serde::{Deserialize, Serialize};

/// Events emitted by the session aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    /// A customer scanned the QR code and opened a session.
    SessionStarted(SessionStartedData),

    /// The device submitted a detection snapshot.
    ItemsDetected(ItemsDetectedData),

    /// The purchase was confirmed after payment.
    SessionCompleted(SessionCompletedData),

    /// The session was cancelled.
    SessionCancelled(SessionCancelledData),
}

impl SessionEvent {
    /// Returns the stable event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::SessionStarted(_) => "SessionStarted",
            SessionEvent::ItemsDetected(_) => "ItemsDetected",
            SessionEvent::SessionCompleted(_) => "SessionCompleted",
            SessionEvent::SessionCancelled(_) => "SessionCancelled",
        }
    }

    /// Returns when the event occurred.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SessionEvent::SessionStarted(data) => data.occurred_at,
            SessionEvent::ItemsDetected(data) => data.occurred_at,
            SessionEvent::SessionCompleted(data) => data.occurred_at,
            SessionEvent::SessionCancelled(data) => data.occurred_at,
        }
    }

    /// Returns the session this event belongs to.
    pub fn session_id(&self) -> SessionId {
        match self {
            SessionEvent::SessionStarted(data) => data.session_id,
            SessionEvent::ItemsDetected(data) => data.session_id,
            SessionEvent::SessionCompleted(data) => data.session_id,
            SessionEvent::SessionCancelled(data) => data.session_id,
        }
    }
}

/// Data for the `SessionStarted` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStartedData {
    pub session_id: SessionId,
    pub device_id: DeviceId,
    pub user_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the `ItemsDetected` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsDetectedData {
    pub session_id: SessionId,
    pub item_count: usize,
    pub total_weight_grams: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the `SessionCompleted` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCompletedData {
    pub session_id: SessionId,
    pub payment_ref: String,
    pub occurred_at: DateTime<Utc>,
}

/// Data for the `SessionCancelled` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCancelledData {
    pub session_id: SessionId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors
impl SessionEvent {
    /// Creates a `SessionStarted` event.
    pub fn session_started(
        session_id: SessionId,
        device_id: DeviceId,
        user_id: Option<String>,
    ) -> Self {
        SessionEvent::SessionStarted(SessionStartedData {
            session_id,
            device_id,
            user_id,
            occurred_at: Utc::now(),
        })
    }

    /// Creates an `ItemsDetected` event.
    pub fn items_detected(session_id: SessionId, item_count: usize, total_weight_grams: f64) -> Self {
        SessionEvent::ItemsDetected(ItemsDetectedData {
            session_id,
            item_count,
            total_weight_grams,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a `SessionCompleted` event.
    pub fn session_completed(session_id: SessionId, payment_ref: impl Into<String>) -> Self {
        SessionEvent::SessionCompleted(SessionCompletedData {
            session_id,
            payment_ref: payment_ref.into(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates a `SessionCancelled` event.
    pub fn session_cancelled(session_id: SessionId, reason: impl Into<String>) -> Self {
        SessionEvent::SessionCancelled(SessionCancelledData {
            session_id,
            reason: reason.into(),
            occurred_at: Utc::now(),
        })
    }
}
