//! Session aggregate and related types.

mod aggregate;
mod events;
mod state;

pub use aggregate::Session;
pub use events::{
    ItemsDetectedData, SessionCancelledData, SessionCompletedData, SessionEvent, SessionStartedData,
};
pub use state::SessionStatus;
