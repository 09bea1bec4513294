//! Sync channel: the websocket connection to a canvas room.
//!
//! DESIGN
//! ======
//! One channel per open canvas. [`SyncChannel::open`] returns immediately in
//! the `Connecting` state and a background task drives the socket: it
//! connects, forwards queued outbound messages, decodes inbound text frames,
//! and publishes state changes on a `watch` channel
//! (`Connecting -> Open -> Closed`). There is no reconnect; a closed channel
//! stays closed.
//!
//! ERROR HANDLING
//! ==============
//! Sending is fire-and-forget: messages queued while connecting are sent once
//! the socket opens, and messages sent after close are dropped with a debug
//! log. Connect failures, socket errors, and undecodable inbound frames are
//! logged. Nothing is retried; periodic snapshot persistence is the
//! durability backstop.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

use frames::Message;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

/// Lifecycle of a [`SyncChannel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

/// Errors surfaced by the sync channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("sync channel closed")]
    Closed,
}

/// A websocket connection to one canvas room.
pub struct SyncChannel {
    outbound: mpsc::UnboundedSender<String>,
    inbound: Option<mpsc::UnboundedReceiver<Message>>,
    state: watch::Receiver<ChannelState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl SyncChannel {
    /// Start connecting to `url`. The channel is usable immediately; sends
    /// made before the socket opens are queued.
    #[must_use]
    pub fn open(url: String) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(ChannelState::Connecting);
        let (shutdown, shutdown_rx) = oneshot::channel();

        tokio::spawn(drive(url, outbound_rx, inbound_tx, state_tx, shutdown_rx));

        Self { outbound, inbound: Some(inbound), state, shutdown: Some(shutdown) }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// A receiver that observes every state change.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.state.clone()
    }

    /// Wait until the channel leaves `Connecting`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Closed`] if the connection failed or closed
    /// instead of opening.
    pub async fn wait_open(&self) -> Result<(), ChannelError> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|s| *s != ChannelState::Connecting)
            .await
            .map(|s| *s)
            .map_err(|_| ChannelError::Closed)?;
        match settled {
            ChannelState::Open => Ok(()),
            ChannelState::Connecting | ChannelState::Closed => Err(ChannelError::Closed),
        }
    }

    /// Register the single inbound handler. The handler runs on its own task
    /// for every decoded message until the channel closes. A second
    /// registration (or a registration after [`Self::recv`] was used) is
    /// ignored and returns `false`.
    pub fn on_message<F>(&mut self, mut handler: F) -> bool
    where
        F: FnMut(Message) + Send + 'static,
    {
        let Some(mut inbound) = self.inbound.take() else {
            warn!("inbound handler already registered");
            return false;
        };
        tokio::spawn(async move {
            while let Some(message) = inbound.recv().await {
                handler(message);
            }
        });
        true
    }

    /// Receive the next inbound message, or `None` once the channel has
    /// closed (or a handler was registered with [`Self::on_message`]).
    pub async fn recv(&mut self) -> Option<Message> {
        match self.inbound.as_mut() {
            Some(inbound) => inbound.recv().await,
            None => None,
        }
    }

    /// Queue `message` for transmission. Best effort; never blocks.
    pub fn send(&self, message: &Message) {
        let text = match frames::encode_message(message) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, kind = %message.kind, "dropping unencodable outbound message");
                return;
            }
        };
        if self.outbound.send(text).is_err() {
            debug!(kind = %message.kind, "sync channel closed; dropping outbound message");
        }
    }

    /// Close the connection. Idempotent.
    pub fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            if shutdown.send(()).is_err() {
                debug!("sync channel already stopped");
            }
        }
    }
}

impl Drop for SyncChannel {
    fn drop(&mut self) {
        self.close();
    }
}

async fn drive(
    url: String,
    mut outbound: mpsc::UnboundedReceiver<String>,
    inbound: mpsc::UnboundedSender<Message>,
    state: watch::Sender<ChannelState>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let connected = tokio::select! {
        result = connect_async(url.as_str()) => result,
        _ = &mut shutdown => {
            state.send_replace(ChannelState::Closed);
            return;
        }
    };
    let stream = match connected {
        Ok((stream, _)) => stream,
        Err(e) => {
            warn!(error = %e, "sync channel connect failed");
            state.send_replace(ChannelState::Closed);
            return;
        }
    };

    info!("sync channel open");
    state.send_replace(ChannelState::Open);
    let (mut sink, mut source) = stream.split();

    loop {
        // Queued sends drain before a shutdown is honoured.
        tokio::select! {
            biased;
            next = outbound.recv() => {
                let Some(text) = next else { break };
                if let Err(e) = sink.send(WsMessage::Text(text.into())).await {
                    warn!(error = %e, "sync channel send failed");
                    break;
                }
            }
            frame = source.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => match frames::decode_message(text.as_str()) {
                    Ok(message) => {
                        if inbound.send(message).is_err() {
                            debug!("no inbound receiver; dropping message");
                        }
                    }
                    Err(e) => warn!(error = %e, "dropping undecodable inbound message"),
                },
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("sync channel closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "sync channel receive failed");
                    break;
                }
            },
            _ = &mut shutdown => {
                if let Err(e) = sink.send(WsMessage::Close(None)).await {
                    debug!(error = %e, "close frame not sent");
                }
                break;
            }
        }
    }

    state.send_replace(ChannelState::Closed);
    debug!("sync channel stopped");
}
