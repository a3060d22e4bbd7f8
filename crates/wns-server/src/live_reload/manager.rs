//! Live reload manager.
//!
//! Coordinates file watching and WebSocket broadcasting for live reload.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::clients::BroadcastSet;
use super::debouncer::Changed;
use super::watcher::ChangeWatcher;
use crate::error::ServerError;

/// Message pushed to every client when something changed.
pub(crate) const RELOAD_MESSAGE: &str = "updated";

/// Owns the change watcher and the set of connected push clients.
pub(crate) struct LiveReloadManager {
    watcher: ChangeWatcher,
    clients: Arc<BroadcastSet>,
}

impl LiveReloadManager {
    /// Create a new live reload manager around `watcher`.
    #[must_use]
    pub(crate) fn new(watcher: ChangeWatcher) -> Self {
        Self {
            watcher,
            clients: Arc::new(BroadcastSet::new()),
        }
    }

    /// Start the file watcher and the broadcast loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the file watcher cannot be started.
    pub(crate) fn start(&mut self) -> Result<(), ServerError> {
        let receiver = self.watcher.subscribe();
        self.watcher.start()?;
        tokio::spawn(broadcast_changes(receiver, Arc::clone(&self.clients)));
        Ok(())
    }

    /// Clients currently registered for reload messages.
    pub(crate) fn clients(&self) -> Arc<BroadcastSet> {
        Arc::clone(&self.clients)
    }
}

/// Push a reload message to every client for each change notification.
async fn broadcast_changes(mut receiver: broadcast::Receiver<Changed>, clients: Arc<BroadcastSet>) {
    loop {
        match receiver.recv().await {
            // Missed notifications collapse into one more reload.
            Ok(Changed) | Err(broadcast::error::RecvError::Lagged(_)) => {
                let delivered = clients.broadcast(RELOAD_MESSAGE);
                tracing::info!(clients = delivered, "Change detected, reload sent");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
