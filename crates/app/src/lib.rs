//! Use-case orchestrators for the vending transaction system.
//!
//! Each orchestrator is one request-scoped unit of work:
//! load → mutate → persist → drain-and-publish. The aggregate never
//! publishes events itself; orchestrators drain its buffer after a
//! successful save. Publish failures are swallowed (logged) so a broker
//! outage never blocks the customer-facing transaction, while
//! persistence failures always abort and surface.

pub mod cancel_session;
pub mod confirm_session;
pub mod error;
pub mod ports;
pub mod queries;
pub mod start_session;
pub mod submit_detection;

pub use cancel_session::{CancelSession, CancelSessionHandler, CancelSessionResult};
pub use confirm_session::{ConfirmSession, ConfirmSessionHandler, ConfirmSessionResult};
pub use error::AppError;
pub use ports::{
    CatalogResolver, DeviceResolver, DeviceSnapshot, EventSink, InMemoryCatalogResolver,
    InMemoryDeviceResolver, InMemoryEventSink, ResolverError, SinkError, SkuSnapshot,
};
pub use queries::{SessionItemView, SessionQueryService, SessionView};
pub use start_session::{StartSession, StartSessionHandler, StartSessionResult};
pub use submit_detection::{
    RawDetection, ReconciledItem, SubmitDetection, SubmitDetectionHandler, SubmitDetectionResult,
};

use domain::{Session, SessionEvent};

/// Drains the session's event buffer and publishes best-effort.
///
/// Losing a notification is acceptable; losing a financial record is
/// not. Failures are logged at `warn` and never surfaced.
pub(crate) async fn publish_events<E: EventSink>(sink: &E, session: &mut Session) {
    for event in session.take_events() {
        publish_one(sink, &event).await;
    }
}

pub(crate) async fn publish_one<E: EventSink>(sink: &E, event: &SessionEvent) {
    if let Err(err) = sink.publish(event).await {
        tracing::warn!(
            event = event.event_name(),
            session_id = %event.session_id(),
            error = %err,
            "failed to publish domain event"
        );
    }
}
