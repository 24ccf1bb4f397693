//! Domain layer for the vending transaction system.
//!
//! This crate provides the transaction core:
//! - Validated value objects (`Money`, `Currency`, `Weight`, `DetectedItem`)
//! - The `DetectionPolicy` governing trust in machine-vision results
//! - The `Session` aggregate with its lifecycle state machine
//! - Domain events buffered by the aggregate and drained by orchestrators
//! - The `SessionRepository` persistence port

pub mod error;
pub mod policy;
pub mod repository;
pub mod session;
pub mod value_objects;

pub use error::DomainError;
pub use policy::DetectionPolicy;
pub use repository::{RepositoryError, SessionRepository};
pub use session::{
    ItemsDetectedData, Session, SessionCancelledData, SessionCompletedData, SessionEvent,
    SessionStartedData, SessionStatus,
};
pub use value_objects::{Currency, DetectedItem, Money, Weight};
