//! Session lifecycle and lookup endpoints.

use std::sync::Arc;

use app::{
    CancelSession, CancelSessionHandler, ConfirmSession, ConfirmSessionHandler,
    InMemoryCatalogResolver, InMemoryDeviceResolver, InMemoryEventSink, RawDetection,
    SessionQueryService, SessionView, StartSession, StartSessionHandler, SubmitDetection,
    SubmitDetectionHandler,
};
use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use common::{DeviceId, SessionId};
use serde::{Deserialize, Serialize};
use session_store::InMemorySessionStore;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub start: StartSessionHandler<InMemorySessionStore, InMemoryDeviceResolver, InMemoryEventSink>,
    pub submit:
        SubmitDetectionHandler<InMemorySessionStore, InMemoryCatalogResolver, InMemoryEventSink>,
    pub confirm: ConfirmSessionHandler<InMemorySessionStore, InMemoryEventSink>,
    pub cancel: CancelSessionHandler<InMemorySessionStore, InMemoryEventSink>,
    pub queries: SessionQueryService<InMemorySessionStore, InMemoryDeviceResolver>,
    pub sessions: InMemorySessionStore,
    pub catalog: InMemoryCatalogResolver,
    pub devices: InMemoryDeviceResolver,
    pub events: InMemoryEventSink,
}

// -- Request types --

#[derive(Deserialize)]
pub struct StartSessionRequest {
    pub machine_id: String,
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SubmitDetectionRequest {
    pub device_id: String,
    pub detections: Vec<DetectionRequest>,
    pub total_weight_grams: f64,
}

#[derive(Deserialize)]
pub struct DetectionRequest {
    pub product_code: String,
    pub confidence: f64,
}

#[derive(Deserialize)]
pub struct ConfirmSessionRequest {
    pub payment_ref: String,
}

#[derive(Deserialize)]
pub struct CancelSessionRequest {
    pub reason: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct SessionStartedResponse {
    pub session_id: SessionId,
    pub device_id: DeviceId,
    pub status: &'static str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct DetectionResponse {
    pub session_id: SessionId,
    pub items: Vec<DetectionItemResponse>,
    pub total_minor: i64,
    pub currency: String,
    pub weight_match: bool,
    pub needs_fallback: bool,
}

#[derive(Serialize)]
pub struct DetectionItemResponse {
    pub code: String,
    pub name: String,
    pub unit_price_minor: i64,
    pub currency: String,
    pub confidence: f64,
}

#[derive(Serialize)]
pub struct SessionConfirmedResponse {
    pub session_id: SessionId,
    pub status: &'static str,
    pub total_minor: i64,
    pub currency: String,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct SessionCancelledResponse {
    pub session_id: SessionId,
    pub status: &'static str,
}

// -- Handlers --

/// POST /sessions — open a session on a vending machine.
#[tracing::instrument(skip(state, req))]
pub async fn start(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartSessionRequest>,
) -> Result<(axum::http::StatusCode, Json<SessionStartedResponse>), ApiError> {
    let result = state
        .start
        .handle(StartSession {
            machine_id: req.machine_id,
            user_id: req.user_id,
        })
        .await?;

    let response = SessionStartedResponse {
        session_id: result.session_id,
        device_id: result.device_id,
        status: "active",
        expires_at: result.expires_at,
    };

    Ok((axum::http::StatusCode::CREATED, Json(response)))
}

/// POST /sessions/:id/detections — submit a detection snapshot.
#[tracing::instrument(skip(state, req))]
pub async fn submit_detection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SubmitDetectionRequest>,
) -> Result<Json<DetectionResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;
    let device_id = DeviceId::parse(&req.device_id)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let detections = req
        .detections
        .into_iter()
        .map(|d| RawDetection {
            product_code: d.product_code,
            confidence: d.confidence,
        })
        .collect();

    let result = state
        .submit
        .handle(SubmitDetection {
            session_id,
            device_id,
            detections,
            total_weight_grams: req.total_weight_grams,
        })
        .await?;

    let items = result
        .items
        .into_iter()
        .map(|item| DetectionItemResponse {
            code: item.code,
            name: item.name,
            unit_price_minor: item.unit_price_minor,
            currency: item.currency,
            confidence: item.confidence,
        })
        .collect();

    Ok(Json(DetectionResponse {
        session_id: result.session_id,
        items,
        total_minor: result.total_minor,
        currency: result.currency,
        weight_match: result.weight_match,
        needs_fallback: result.needs_fallback,
    }))
}

/// POST /sessions/:id/confirm — complete the purchase after payment.
#[tracing::instrument(skip(state, req))]
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ConfirmSessionRequest>,
) -> Result<Json<SessionConfirmedResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;

    let result = state
        .confirm
        .handle(ConfirmSession {
            session_id,
            payment_ref: req.payment_ref,
        })
        .await?;

    Ok(Json(SessionConfirmedResponse {
        session_id: result.session_id,
        status: "completed",
        total_minor: result.total_minor,
        currency: result.currency,
        completed_at: result.completed_at,
    }))
}

/// POST /sessions/:id/cancel — abandon the session.
#[tracing::instrument(skip(state, req))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CancelSessionRequest>,
) -> Result<Json<SessionCancelledResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;

    let result = state
        .cancel
        .handle(CancelSession {
            session_id,
            reason: req.reason.unwrap_or_else(|| "cancelled by user".to_string()),
        })
        .await?;

    Ok(Json(SessionCancelledResponse {
        session_id: result.session_id,
        status: "cancelled",
    }))
}

/// GET /sessions/:id — fetch a session read model.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session_id = parse_session_id(&id)?;
    let view = state.queries.get_session(session_id).await?;
    Ok(Json(view))
}

/// GET /devices/:machine_id/session — the machine's active session.
#[tracing::instrument(skip(state))]
pub async fn active_for_device(
    State(state): State<Arc<AppState>>,
    Path(machine_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state
        .queries
        .get_active_session_for_device(&machine_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("no active session on machine {machine_id}"))
        })?;
    Ok(Json(view))
}

fn parse_session_id(id: &str) -> Result<SessionId, ApiError> {
    SessionId::parse(id).map_err(|e| ApiError::BadRequest(e.to_string()))
}
