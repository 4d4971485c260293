//! Event Store
//!
//! Persisted domain events. Written only through the unit of work so every
//! state transition leaves an event behind.

pub mod entity;

pub use entity::{Event, ContextData, CLOUDEVENTS_SPEC_VERSION};
