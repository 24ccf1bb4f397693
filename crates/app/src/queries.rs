//! Read-side queries over stored sessions.

use chrono::{DateTime, Utc};
use common::{DeviceId, SessionId, SkuId};
use domain::{DetectedItem, Session, SessionRepository, SessionStatus};

use crate::error::{AppError, Result};
use crate::ports::DeviceResolver;

/// Flat read model of a detected item.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SessionItemView {
    pub sku_id: SkuId,
    pub code: String,
    pub name: String,
    pub confidence: f64,
    pub unit_price_minor: i64,
    pub currency: String,
}

/// Flat read model of a session, as served to clients.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub device_id: DeviceId,
    pub user_id: Option<String>,
    pub status: SessionStatus,
    pub items: Vec<SessionItemView>,
    pub total_weight_grams: f64,
    pub total_minor: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionView {
    fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id(),
            device_id: session.device_id(),
            user_id: session.user_id().map(str::to_string),
            status: session.status(),
            items: session.items().iter().map(item_view).collect(),
            total_weight_grams: session.total_weight().grams(),
            total_minor: session.total_amount().minor_units(),
            currency: session.total_amount().currency().to_string(),
            created_at: session.created_at(),
            expires_at: session.expires_at(),
            completed_at: session.completed_at(),
        }
    }
}

fn item_view(item: &DetectedItem) -> SessionItemView {
    SessionItemView {
        sku_id: item.sku_id,
        code: item.code.clone(),
        name: item.name.clone(),
        confidence: item.confidence,
        unit_price_minor: item.unit_price.minor_units(),
        currency: item.unit_price.currency().to_string(),
    }
}

/// Serves session read models.
///
/// Reads report the stored status verbatim and never evaluate expiry;
/// a lapsed-but-unexpired session still reads as `active` until a
/// write touches it.
pub struct SessionQueryService<R, D> {
    sessions: R,
    devices: D,
}

impl<R, D> SessionQueryService<R, D>
where
    R: SessionRepository,
    D: DeviceResolver,
{
    pub fn new(sessions: R, devices: D) -> Self {
        Self { sessions, devices }
    }

    /// Fetches a session by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_session(&self, session_id: SessionId) -> Result<SessionView> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(AppError::SessionNotFound(session_id))?;
        Ok(SessionView::from_session(&session))
    }

    /// Fetches the newest active session on a machine, if any.
    #[tracing::instrument(skip(self))]
    pub async fn get_active_session_for_device(
        &self,
        machine_id: &str,
    ) -> Result<Option<SessionView>> {
        let device = self
            .devices
            .resolve_by_machine_id(machine_id)
            .await?
            .ok_or_else(|| AppError::DeviceNotFound(machine_id.to_string()))?;

        let session = self.sessions.find_active_by_device(device.device_id).await?;
        Ok(session.as_ref().map(SessionView::from_session))
    }
}
