//! Shared relay state.
//!
//! DESIGN
//! ======
//! `RelayState` is injected into Axum handlers via the `State` extractor.
//! It holds one `CanvasRoom` per canvas id: the last stored snapshot and the
//! outbound queues of the sockets currently joined to that canvas. Rooms are
//! created lazily by either a snapshot write or a socket join.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Per-canvas live state.
#[derive(Debug, Default)]
pub struct CanvasRoom {
    /// Last stored snapshot; `Value::Null` until the first write.
    pub content: Value,
    /// Connected sockets: `client_id` -> queue of outgoing text frames.
    pub clients: HashMap<Uuid, mpsc::Sender<String>>,
}

impl CanvasRoom {
    /// Whether the room can be dropped without losing anything.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.clients.is_empty() && self.content.is_null()
    }
}

/// Shared application state. Clone is required by Axum; the room map is
/// behind an `Arc`.
#[derive(Clone, Default)]
pub struct RelayState {
    pub canvases: Arc<RwLock<HashMap<String, CanvasRoom>>>,
}

impl RelayState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
