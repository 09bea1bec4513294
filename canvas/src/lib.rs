//! Pure core of the collaborative canvas sync engine.
//!
//! This crate holds everything that does not touch I/O: the canvas document
//! and its reducers, the coordinate mapping between screen and canvas space,
//! the shared settings snapshot, and the local mutation dispatcher that turns
//! pointer gestures into document mutations. The runtime crate wires the
//! resulting [`engine::Action`]s to the sync channel and the persistence
//! coalescer, and feeds inbound peer mutations back through
//! [`engine::Engine::apply_remote`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Local mutation dispatcher ([`engine::Engine`]) |
//! | [`doc`] | Document, strokes, overlay objects, and reducers |
//! | [`camera`] | Zoom and screen/canvas coordinate conversions |
//! | [`input`] | Modes, settings snapshot, and the gesture state machine |
//! | [`hit`] | Nearest edge/corner picking for shape resize |
//! | [`consts`] | Shared numeric constants (size floor, default sizes, zoom limits) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
