//! HTTP API server for the vending transaction system.
//!
//! Exposes the session lifecycle over REST, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use app::{
    CancelSessionHandler, ConfirmSessionHandler, DeviceSnapshot, InMemoryCatalogResolver,
    InMemoryDeviceResolver, InMemoryEventSink, SessionQueryService, SkuSnapshot,
    StartSessionHandler, SubmitDetectionHandler,
};
use axum::Router;
use axum::routing::{get, post};
use common::{DeviceId, SkuId};
use domain::{Currency, Money, Weight};
use metrics_exporter_prometheus::PrometheusHandle;
use session_store::InMemorySessionStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::sessions::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/sessions", post(routes::sessions::start))
        .route("/sessions/{id}", get(routes::sessions::get))
        .route(
            "/sessions/{id}/detections",
            post(routes::sessions::submit_detection),
        )
        .route("/sessions/{id}/confirm", post(routes::sessions::confirm))
        .route("/sessions/{id}/cancel", post(routes::sessions::cancel))
        .route(
            "/devices/{machine_id}/session",
            get(routes::sessions::active_for_device),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state with in-memory adapters.
///
/// Seeds a demo machine and a small product catalog so the server is
/// usable out of the box.
pub fn create_default_state() -> Arc<AppState> {
    let sessions = InMemorySessionStore::new();
    let catalog = InMemoryCatalogResolver::new();
    let devices = InMemoryDeviceResolver::new();
    let events = InMemoryEventSink::new();

    seed_demo_data(&catalog, &devices);

    Arc::new(AppState {
        start: StartSessionHandler::new(sessions.clone(), devices.clone(), events.clone()),
        submit: SubmitDetectionHandler::new(sessions.clone(), catalog.clone(), events.clone()),
        confirm: ConfirmSessionHandler::new(sessions.clone(), events.clone()),
        cancel: CancelSessionHandler::new(sessions.clone(), events.clone()),
        queries: SessionQueryService::new(sessions.clone(), devices.clone()),
        sessions,
        catalog,
        devices,
        events,
    })
}

fn seed_demo_data(catalog: &InMemoryCatalogResolver, devices: &InMemoryDeviceResolver) {
    devices.insert(DeviceSnapshot {
        device_id: DeviceId::new(),
        machine_id: "VM-001".to_string(),
        is_active: true,
    });

    let products: [(&str, &str, i64, f64); 3] = [
        ("COLA-330", "Cola 330ml", 180, 360.0),
        ("WATER-500", "Still Water 500ml", 120, 510.0),
        ("CHIPS-050", "Salted Chips 50g", 220, 55.0),
    ];
    for (code, name, price_minor, grams) in products {
        let Ok(unit_price) = Money::new(price_minor, Currency::USD) else {
            continue;
        };
        let Ok(weight) = Weight::new(grams) else {
            continue;
        };
        catalog.insert(SkuSnapshot {
            sku_id: SkuId::new(),
            code: code.to_string(),
            name: name.to_string(),
            unit_price,
            weight,
        });
    }
}
