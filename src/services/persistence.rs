//! Persistence coalescer: debounced full-snapshot writes.
//!
//! DESIGN
//! ======
//! Every document change is published to a background worker over a `watch`
//! channel, which keeps only the latest snapshot. The worker restarts a fixed
//! debounce timer on each change; when the timer expires (or an explicit
//! flush arrives) it writes the latest snapshot through the [`CanvasStore`].
//! N changes inside one window therefore produce exactly one write, and that
//! write carries the state after the Nth change.
//!
//! Writes are awaited inside the worker, so they never overlap and a newer
//! snapshot can never be overwritten by an older one.
//!
//! Flush requests and resets travel on the same `watch` channel as changes,
//! so an idle worker wakes for them and nothing is left pending for a later
//! change. A reset installs a state that is already persisted (for example a
//! freshly loaded document) and marks its revision clean, so the worker has
//! nothing to write until the next change.
//!
//! ERROR HANDLING
//! ==============
//! A failed write is logged and not retried; the snapshot stays unsaved until
//! the next change or an explicit flush triggers another write. Dropping the
//! coalescer (or calling [`Coalescer::close`]) abandons a pending debounce
//! without writing it, but a write already in flight runs to completion. The
//! same holds for a reset: it cancels a pending write, not one in flight.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::sync::Arc;
use std::time::Duration;

use canvas::doc::Document;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::services::store::CanvasStore;

/// One published document state.
#[derive(Clone, Debug, Default)]
struct Snapshot {
    revision: u64,
    content: Document,
    /// Highest revision known to be persisted without a write.
    clean: u64,
    /// Bumped on every flush request.
    flush: u64,
}

impl Snapshot {
    fn is_clean(&self, saved: u64) -> bool {
        self.revision <= self.clean.max(saved)
    }
}

/// Handle to the debounced snapshot writer of one canvas.
pub struct Coalescer {
    changes: watch::Sender<Snapshot>,
    saved: watch::Receiver<u64>,
    worker: JoinHandle<()>,
}

impl Coalescer {
    /// Start the writer for `canvas_id`. `content` is the state as loaded and
    /// counts as already saved.
    #[must_use]
    pub fn spawn(
        store: Arc<dyn CanvasStore>,
        canvas_id: String,
        token: String,
        debounce: Duration,
        content: Document,
    ) -> Self {
        let (changes, changes_rx) = watch::channel(Snapshot { content, ..Snapshot::default() });
        let (saved_tx, saved) = watch::channel(0_u64);

        info!(canvas_id = %canvas_id, debounce = ?debounce, "persistence coalescer started");
        let worker = tokio::spawn(run_worker(
            WorkerContext { store, canvas_id, token, debounce },
            changes_rx,
            saved_tx,
        ));

        Self { changes, saved, worker }
    }

    /// Record a new document state and restart the debounce timer.
    pub fn mark_changed(&self, content: &Document) {
        self.changes.send_modify(|snapshot| {
            snapshot.revision += 1;
            snapshot.content = content.clone();
        });
    }

    /// Replace the latest state with `content`, which is already persisted.
    /// A pending write of older state is dropped.
    pub fn reset(&self, content: &Document) {
        self.changes.send_modify(|snapshot| {
            snapshot.revision += 1;
            snapshot.clean = snapshot.revision;
            snapshot.content = content.clone();
        });
    }

    /// Write the latest state now instead of waiting out the debounce.
    pub fn flush(&self) {
        if self.has_unsaved_changes() {
            self.changes.send_modify(|snapshot| snapshot.flush += 1);
        }
    }

    /// Whether the latest recorded state has not been written successfully.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        !self.changes.borrow().is_clean(*self.saved.borrow())
    }

    /// Wait until the latest recorded state has been written.
    ///
    /// Returns `false` if the writer stopped first.
    pub async fn wait_until_saved(&self) -> bool {
        let (target, clean) = {
            let snapshot = self.changes.borrow();
            (snapshot.revision, snapshot.clean)
        };
        if target <= clean {
            return true;
        }
        let mut saved = self.saved.clone();
        saved.wait_for(|revision| *revision >= target).await.is_ok()
    }

    /// Stop the writer. A pending debounce is dropped without writing; a
    /// write already in progress completes in the background.
    pub fn close(self) -> JoinHandle<()> {
        let Self { changes, worker, .. } = self;
        drop(changes);
        worker
    }
}

struct WorkerContext {
    store: Arc<dyn CanvasStore>,
    canvas_id: String,
    token: String,
    debounce: Duration,
}

async fn run_worker(ctx: WorkerContext, mut changes: watch::Receiver<Snapshot>, saved: watch::Sender<u64>) {
    let mut flushed = 0;
    while changes.changed().await.is_ok() {
        if !debounce(&ctx, &mut changes, flushed).await {
            break;
        }
        let snapshot = changes.borrow_and_update().clone();
        flushed = snapshot.flush;
        if snapshot.is_clean(*saved.borrow()) {
            debug!(canvas_id = %ctx.canvas_id, revision = snapshot.revision, "nothing to save");
            continue;
        }
        match ctx.store.save(&ctx.canvas_id, &ctx.token, &snapshot.content).await {
            Ok(()) => {
                debug!(canvas_id = %ctx.canvas_id, revision = snapshot.revision, "canvas snapshot saved");
                saved.send_replace(snapshot.revision);
            }
            Err(e) => {
                error!(error = %e, canvas_id = %ctx.canvas_id, revision = snapshot.revision, "canvas save failed");
            }
        }
    }
    debug!(canvas_id = %ctx.canvas_id, "persistence coalescer stopped");
}

/// Wait for a quiet period of `ctx.debounce`, restarting on every change.
/// A flush request newer than `flushed` ends the wait at once. Returns
/// `false` if the coalescer was dropped.
async fn debounce(ctx: &WorkerContext, changes: &mut watch::Receiver<Snapshot>, flushed: u64) -> bool {
    loop {
        if changes.borrow_and_update().flush != flushed {
            return true;
        }
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    return false;
                }
            }
            () = tokio::time::sleep(ctx.debounce) => return true,
        }
    }
}
