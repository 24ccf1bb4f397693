//! Strongly-typed identifiers.
//!
//! Each identifier wraps a UUID in its own nominal type so a session id
//! can never be passed where a device id is expected. The nil UUID acts
//! as the "unset" sentinel.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a raw string is not a valid identifier.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {kind} format: {raw}")]
pub struct IdParseError {
    /// Which identifier type failed to parse.
    pub kind: &'static str,
    /// The offending input.
    pub raw: String,
}

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parses an identifier from its string form.
            pub fn parse(raw: &str) -> Result<Self, IdParseError> {
                Uuid::parse_str(raw).map(Self).map_err(|_| IdParseError {
                    kind: $kind,
                    raw: raw.to_string(),
                })
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Returns true if this is the unset sentinel.
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a shopping session.
    SessionId,
    "session ID"
);

uuid_id!(
    /// Unique identifier for a vending device.
    DeviceId,
    "device ID"
);

uuid_id!(
    /// Unique identifier for a catalog SKU.
    SkuId,
    "SKU ID"
);
