//! Real-time sync engine for a collaborative canvas.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each participant holds a full copy of the canvas document (overlay objects,
//! freehand strokes, background image). Local gestures mutate that copy
//! immediately and are broadcast as `{ type, payload }` messages over a
//! websocket room; peers apply them with the same pure reducers. A debounced
//! writer pushes full snapshots to the storage service. There is no central
//! authority, so concurrent edits of one object converge only by
//! last-writer-wins in arrival order.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`config`] | Base URL, debounce, and timeouts from the environment |
//! | [`protocol`] | Dispatcher actions to wire messages |
//! | [`services::channel`] | Websocket connection to a canvas room |
//! | [`services::applier`] | Inbound messages to document reducers |
//! | [`services::persistence`] | Debounced snapshot writes |
//! | [`services::store`] | Snapshot storage client |
//! | [`services::session`] | One open canvas, wiring all of the above |
//!
//! The document model and the gesture dispatcher live in the `canvas` crate;
//! the envelope codec lives in `frames`.

pub mod config;
pub mod protocol;
pub mod services;

#[cfg(test)]
mod test_support;
