//! Event sink port and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::SessionEvent;
use thiserror::Error;

/// Error surfaced by event sink implementations.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The broker could not accept the event.
    #[error("event sink unavailable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget output port for domain events.
///
/// Orchestrators publish after a successful save and swallow failures;
/// implementations must not block the transaction path.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publishes a single domain event.
    async fn publish(&self, event: &SessionEvent) -> Result<(), SinkError>;
}

#[derive(Debug, Default)]
struct SinkState {
    published: Vec<SessionEvent>,
    fail_on_publish: bool,
}

/// In-memory recording sink for testing and default wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSink {
    state: Arc<RwLock<SinkState>>,
}

impl InMemoryEventSink {
    /// Creates a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all events published so far.
    pub fn published(&self) -> Vec<SessionEvent> {
        self.state.read().unwrap().published.clone()
    }

    /// Returns the number of published events.
    pub fn published_count(&self) -> usize {
        self.state.read().unwrap().published.len()
    }

    /// Configures the sink to reject publishes.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn publish(&self, event: &SessionEvent) -> Result<(), SinkError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_publish {
            return Err(SinkError::Unavailable("broker offline".to_string()));
        }
        state.published.push(event.clone());
        Ok(())
    }
}
