//! StartSession use case.

use chrono::{DateTime, Utc};
use common::{DeviceId, SessionId};
use domain::{Session, SessionRepository};

use crate::error::{AppError, Result};
use crate::ports::{DeviceResolver, EventSink};
use crate::publish_events;

/// Default session expiry window in minutes.
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 30;

/// Command to open a session after a QR-code scan.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// Machine id printed on the device.
    pub machine_id: String,
    /// The scanning user, when the app provides one.
    pub user_id: Option<String>,
}

/// Result of a started session.
#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub session_id: SessionId,
    pub device_id: DeviceId,
    pub expires_at: DateTime<Utc>,
}

/// Orchestrates the session start use case.
pub struct StartSessionHandler<R, D, E> {
    sessions: R,
    devices: D,
    events: E,
    expiration_minutes: i64,
}

impl<R, D, E> StartSessionHandler<R, D, E>
where
    R: SessionRepository,
    D: DeviceResolver,
    E: EventSink,
{
    /// Creates a handler with the default 30-minute expiry window.
    pub fn new(sessions: R, devices: D, events: E) -> Self {
        Self {
            sessions,
            devices,
            events,
            expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
        }
    }

    /// Overrides the expiry window.
    pub fn with_expiration_minutes(mut self, minutes: i64) -> Self {
        self.expiration_minutes = minutes;
        self
    }

    /// Resolves the device, creates the session, persists, publishes.
    #[tracing::instrument(skip(self), fields(machine_id = %cmd.machine_id))]
    pub async fn handle(&self, cmd: StartSession) -> Result<StartSessionResult> {
        let device = self
            .devices
            .resolve_by_machine_id(&cmd.machine_id)
            .await?
            .ok_or_else(|| AppError::DeviceNotFound(cmd.machine_id.clone()))?;

        if !device.is_active {
            return Err(AppError::DeviceInactive(cmd.machine_id));
        }

        let mut session = Session::new(device.device_id, cmd.user_id, self.expiration_minutes)?;
        self.sessions.save(&session).await?;
        publish_events(&self.events, &mut session).await;

        metrics::counter!("sessions_started_total").increment(1);
        tracing::info!(session_id = %session.id(), device_id = %device.device_id, "session started");

        Ok(StartSessionResult {
            session_id: session.id(),
            device_id: device.device_id,
            expires_at: session.expires_at(),
        })
    }
}
