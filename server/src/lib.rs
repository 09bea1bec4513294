//! Relay: in-memory canvas rooms and snapshot store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Canvas clients need two collaborators: a websocket room that fans each
//! message out to the other participants of a canvas, and a store that keeps
//! the latest full snapshot. The relay provides both in one process with no
//! durable storage, for local runs and end-to-end tests.

pub mod routes;
pub mod services;
pub mod state;
