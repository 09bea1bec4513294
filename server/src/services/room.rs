//! Room service: join/part, fan-out, and snapshot storage per canvas.
//!
//! DESIGN
//! ======
//! The relay has no canvas semantics: it stores whatever snapshot a client
//! writes and forwards every valid envelope to the other sockets of the same
//! canvas. A room stays in memory while it has clients or stored content.
//!
//! ERROR HANDLING
//! ==============
//! Fan-out is best effort. A peer whose queue is full or closed is skipped
//! with a warning; the sender is never told.

#[cfg(test)]
#[path = "room_test.rs"]
mod room_test;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::RelayState;

/// Register `client_id` on `canvas_id`. Returns the number of sockets now in
/// the room.
pub async fn join(state: &RelayState, canvas_id: &str, client_id: Uuid, tx: mpsc::Sender<String>) -> usize {
    let mut canvases = state.canvases.write().await;
    let room = canvases.entry(canvas_id.to_owned()).or_default();
    room.clients.insert(client_id, tx);
    info!(canvas_id, %client_id, clients = room.clients.len(), "client joined canvas");
    room.clients.len()
}

/// Remove `client_id` from `canvas_id`, dropping the room if nothing is left.
pub async fn part(state: &RelayState, canvas_id: &str, client_id: Uuid) {
    let mut canvases = state.canvases.write().await;
    let Some(room) = canvases.get_mut(canvas_id) else {
        return;
    };

    room.clients.remove(&client_id);
    info!(canvas_id, %client_id, remaining = room.clients.len(), "client left canvas");

    if room.is_idle() {
        canvases.remove(canvas_id);
        info!(canvas_id, "evicted canvas from memory");
    }
}

/// Queue `text` for every socket on `canvas_id` except `exclude`. Returns the
/// number of peers it was queued for.
pub async fn broadcast(state: &RelayState, canvas_id: &str, text: &str, exclude: Option<Uuid>) -> usize {
    let canvases = state.canvases.read().await;
    let Some(room) = canvases.get(canvas_id) else {
        return 0;
    };

    let mut delivered = 0;
    for (client_id, tx) in &room.clients {
        if exclude == Some(*client_id) {
            continue;
        }
        match tx.try_send(text.to_owned()) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => warn!(canvas_id, %client_id, "peer queue full; dropping message"),
            Err(TrySendError::Closed(_)) => warn!(canvas_id, %client_id, "peer gone; dropping message"),
        }
    }
    delivered
}

/// The stored snapshot of `canvas_id`, or `Value::Null` if none was written.
pub async fn load_content(state: &RelayState, canvas_id: &str) -> Value {
    let canvases = state.canvases.read().await;
    canvases.get(canvas_id).map_or(Value::Null, |room| room.content.clone())
}

/// Replace the stored snapshot of `canvas_id`.
pub async fn save_content(state: &RelayState, canvas_id: &str, content: Value) {
    let mut canvases = state.canvases.write().await;
    canvases.entry(canvas_id.to_owned()).or_default().content = content;
    info!(canvas_id, "canvas snapshot stored");
}
