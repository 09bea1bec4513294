//! Canvas session: one open canvas wired to its peers and its storage.
//!
//! DESIGN
//! ======
//! A session owns the dispatcher (and through it the document), the sync
//! channel, and the persistence coalescer. Opening performs one blocking load
//! before anything else, so an empty initial document can never clobber
//! stored content. Afterwards every local gesture applies optimistically,
//! then its messages are queued on the channel, then the coalescer is told
//! the document changed. Inbound messages take the same reducers via the
//! applier and also feed the coalescer.
//!
//! All mutation happens through `&mut self`, so local and remote changes are
//! serialized by the owner and never race.
//!
//! ERROR HANDLING
//! ==============
//! A failed initial load is fatal for the session ([`SessionError::Load`]).
//! After that nothing fails: transport and storage errors are logged by the
//! channel and the coalescer, and the session keeps working locally.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use canvas::doc::Document;
use canvas::engine::{Action, Engine};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::SyncConfig;
use crate::protocol::action_to_message;
use crate::services::applier::{Applied, apply_message};
use crate::services::channel::{ChannelError, SyncChannel};
use crate::services::persistence::Coalescer;
use crate::services::store::{CanvasStore, StoreError};

/// Errors from opening or resyncing a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to load canvas {canvas_id}: {source}")]
    Load {
        canvas_id: String,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// An open canvas.
pub struct CanvasSession {
    canvas_id: String,
    token: String,
    store: Arc<dyn CanvasStore>,
    engine: Engine,
    channel: SyncChannel,
    coalescer: Coalescer,
}

impl CanvasSession {
    /// Load `canvas_id`, then connect to its room and start persistence.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Load`] if the initial load fails, and
    /// [`ChannelError::InvalidBaseUrl`] if no websocket URL can be derived
    /// from the configured base URL.
    pub async fn open(
        config: &SyncConfig,
        store: Arc<dyn CanvasStore>,
        canvas_id: &str,
        token: &str,
    ) -> Result<Self, SessionError> {
        let content = load(store.as_ref(), canvas_id, token).await?;
        let url = config
            .ws_url(canvas_id, token)
            .ok_or_else(|| ChannelError::InvalidBaseUrl(config.base_url.clone()))?;

        info!(
            canvas_id,
            objects = content.objects().len(),
            strokes = content.strokes().len(),
            "canvas session opened"
        );

        let channel = SyncChannel::open(url);
        let coalescer = Coalescer::spawn(
            Arc::clone(&store),
            canvas_id.to_owned(),
            token.to_owned(),
            config.save_debounce,
            content.clone(),
        );

        Ok(Self {
            canvas_id: canvas_id.to_owned(),
            token: token.to_owned(),
            store,
            engine: Engine::with_document(content),
            channel,
            coalescer,
        })
    }

    #[must_use]
    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    /// The dispatcher, for read access to settings, selection, and document.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.engine.doc
    }

    #[must_use]
    pub fn channel(&self) -> &SyncChannel {
        &self.channel
    }

    /// Run a local gesture or edit on the dispatcher and publish its actions.
    pub fn local<F>(&mut self, gesture: F) -> Vec<Action>
    where
        F: FnOnce(&mut Engine) -> Vec<Action>,
    {
        let actions = gesture(&mut self.engine);
        self.publish(&actions);
        actions
    }

    fn publish(&self, actions: &[Action]) {
        let mut changed = false;
        for action in actions {
            match action_to_message(action) {
                Ok(message) => self.channel.send(&message),
                Err(e) => warn!(error = %e, canvas_id = %self.canvas_id, "failed to encode local action"),
            }
            changed |= !matches!(action, Action::DrawProgress(_));
        }
        if changed {
            self.coalescer.mark_changed(&self.engine.doc);
        }
    }

    /// Wait for the next inbound message and apply it. Returns `None` once
    /// the channel has closed.
    pub async fn next_remote(&mut self) -> Option<Applied> {
        let message = self.channel.recv().await?;
        let applied = apply_message(&mut self.engine, &message);
        if matches!(applied, Applied::Mutated(_)) {
            self.coalescer.mark_changed(&self.engine.doc);
        }
        Some(applied)
    }

    /// Replace the local document with the stored one, discarding anything
    /// not yet persisted. A pending write of the discarded state is dropped
    /// with it. This is the only way to reconverge with peers after lost or
    /// reordered messages.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Load`] if the load fails; the local document
    /// is left unchanged.
    pub async fn resync(&mut self) -> Result<(), SessionError> {
        let content = load(self.store.as_ref(), &self.canvas_id, &self.token).await?;
        info!(canvas_id = %self.canvas_id, "canvas resynced from storage");
        self.engine.load_content(content);
        self.coalescer.reset(&self.engine.doc);
        Ok(())
    }

    /// Write the current document now.
    pub fn flush(&self) {
        self.coalescer.flush();
    }

    /// Whether local changes have not been persisted yet.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.coalescer.has_unsaved_changes()
    }

    /// Wait until the current document has been persisted.
    pub async fn wait_until_saved(&self) -> bool {
        self.coalescer.wait_until_saved().await
    }

    /// Tear down the channel and the persistence timer. A write already in
    /// flight is not cancelled; the returned handle completes after it.
    pub fn close(self) -> JoinHandle<()> {
        let Self { canvas_id, mut channel, coalescer, .. } = self;
        channel.close();
        info!(canvas_id = %canvas_id, "canvas session closed");
        coalescer.close()
    }
}

async fn load(store: &dyn CanvasStore, canvas_id: &str, token: &str) -> Result<Document, SessionError> {
    store.load(canvas_id, token).await.map_err(|source| {
        error!(error = %source, canvas_id, "canvas load failed");
        SessionError::Load { canvas_id: canvas_id.to_owned(), source }
    })
}
