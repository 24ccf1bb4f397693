//! Session repository adapters.
//!
//! The production deployment backs [`domain::SessionRepository`] with a
//! relational store; this crate ships the in-memory implementation used
//! by tests and the default server wiring.

pub mod memory;

pub use memory::InMemorySessionStore;
