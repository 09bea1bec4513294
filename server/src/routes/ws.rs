//! WebSocket handler: per-canvas message fan-out.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, joins the canvas room, and enters a
//! `select!` loop:
//! - Incoming client text → validate as a `{ type, payload }` envelope →
//!   forward verbatim to every other socket on the canvas
//! - Queued text from peers → forward to client
//!
//! The relay never echoes a message to its sender and never interprets
//! payloads. Envelopes that fail to decode are dropped with a warning.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade (token required) → join room
//! 2. Relay until either side closes
//! 3. Part room

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::routes::RelayError;
use crate::services::room;
use crate::state::RelayState;

/// Outgoing queue depth per socket.
const CLIENT_QUEUE: usize = 256;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<RelayState>,
    Path(canvas_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    if params.get("token").is_none_or(|t| t.trim().is_empty()) {
        return RelayError::Unauthorized.into_response();
    }

    ws.on_upgrade(move |socket| run_ws(socket, state, canvas_id))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: RelayState, canvas_id: String) {
    let client_id = Uuid::new_v4();
    let (client_tx, mut client_rx) = mpsc::channel::<String>(CLIENT_QUEUE);
    room::join(&state, &canvas_id, client_id, client_tx).await;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => relay_text(&state, &canvas_id, client_id, text.as_str()).await,
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(text) = client_rx.recv() => {
                if let Err(e) = socket.send(Message::Text(text.into())).await {
                    debug!(%client_id, error = %e, "ws: send to client failed");
                    break;
                }
            }
        }
    }

    room::part(&state, &canvas_id, client_id).await;
    info!(%client_id, canvas_id, "ws: client disconnected");
}

/// Forward one inbound text frame to the sender's peers if it is a valid
/// envelope.
async fn relay_text(state: &RelayState, canvas_id: &str, client_id: Uuid, text: &str) {
    match frames::decode_message(text) {
        Ok(message) => {
            let peers = room::broadcast(state, canvas_id, text, Some(client_id)).await;
            debug!(%client_id, canvas_id, kind = %message.kind, peers, "ws: relayed message");
        }
        Err(e) => warn!(%client_id, canvas_id, error = %e, "ws: dropping invalid envelope"),
    }
}
