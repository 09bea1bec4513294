//! Runtime services behind an open canvas.
//!
//! ARCHITECTURE
//! ============
//! `session` is the entry point and owns one of each of the others: the
//! websocket `channel`, the debounced `persistence` writer, and the
//! `applier` that feeds inbound messages through the document reducers.
//! `store` is the seam to the snapshot storage service.

pub mod applier;
pub mod channel;
pub mod persistence;
pub mod session;
pub mod store;
