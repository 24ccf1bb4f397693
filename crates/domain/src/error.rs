//! Domain error types.

use thiserror::Error;

use crate::session::SessionStatus;
use crate::value_objects::Currency;

/// Errors that can occur during domain operations.
///
/// These are business-rule violations and validation failures; none of
/// them is fatal and all are surfaced to callers as typed errors.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    /// Money amounts are stored in minor units and may not be negative.
    #[error("money amount cannot be negative: {minor_units}")]
    NegativeAmount { minor_units: i64 },

    /// Currency codes are three ASCII letters (ISO 4217).
    #[error("currency must be a 3-letter ISO code: {raw:?}")]
    InvalidCurrency { raw: String },

    /// Arithmetic between different currencies is not defined.
    #[error("cannot add {right} to {left}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// Weights are non-negative gram measurements.
    #[error("invalid weight: {grams} grams")]
    InvalidWeight { grams: f64 },

    /// Detection confidence thresholds live in [0, 1].
    #[error("confidence threshold must be between 0 and 1: {value}")]
    InvalidConfidenceThreshold { value: f64 },

    /// Weight tolerances may not be negative.
    #[error("weight tolerance cannot be negative: {value}")]
    InvalidWeightTolerance { value: f64 },

    /// Sessions must be bound to a real device.
    #[error("invalid device ID: a session requires a non-nil device")]
    DeviceIdRequired,

    /// The session is not in the active state (or its window lapsed).
    #[error("session is not active (status: {status})")]
    SessionNotActive { status: SessionStatus },

    /// The session's expiry window has passed.
    #[error("session has expired")]
    SessionExpired,

    /// Completed sessions cannot be cancelled.
    #[error("session already completed")]
    SessionAlreadyCompleted,

    /// Confirmation requires at least one detected item.
    #[error("no items detected in session")]
    NoItemsDetected,
}
