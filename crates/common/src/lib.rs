//! Shared types for the vending transaction system.

pub mod ids;

pub use ids::{DeviceId, IdParseError, SessionId, SkuId};
