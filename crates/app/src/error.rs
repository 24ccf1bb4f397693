//! Application-level error types.

use common::SessionId;
use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::ports::ResolverError;

/// Errors surfaced at the use-case boundary.
///
/// Not-found variants map to 404-equivalent outcomes at the transport;
/// domain errors are business-rule conflicts; repository and resolver
/// errors are infrastructure failures. Event-publish failures never
/// appear here; orchestrators swallow and log them.
#[derive(Debug, Error)]
pub enum AppError {
    /// No session exists with the given id.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// No device is registered under the given machine id.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The device exists but is not accepting sessions.
    #[error("device is inactive: {0}")]
    DeviceInactive(String),

    /// A business rule was violated; passed through unchanged.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The session store failed; the operation was aborted.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// A resolver failed outside the per-item degradation path.
    #[error("resolver error: {0}")]
    Resolver(#[from] ResolverError),
}

/// Convenience result alias for use-case handlers.
pub type Result<T> = std::result::Result<T, AppError>;
