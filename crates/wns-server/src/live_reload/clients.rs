//! Connected push clients.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;
use uuid::Uuid;

/// One upgraded push connection, as seen by the broadcaster.
///
/// Messages pushed into `sender` are forwarded to the socket by the
/// connection's own task.
#[derive(Clone, Debug)]
pub(crate) struct PushClient {
    id: Uuid,
    sender: mpsc::UnboundedSender<String>,
}

impl PushClient {
    pub(crate) fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }
}

/// Set of push clients eligible for the next broadcast.
#[derive(Debug, Default)]
pub(crate) struct BroadcastSet {
    clients: Mutex<Vec<PushClient>>,
}

impl BroadcastSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a client.
    pub(crate) fn insert(&self, client: PushClient) {
        self.lock().push(client);
    }

    /// Remove the first client with the given id.
    ///
    /// Returns `false` if no such client was registered.
    pub(crate) fn remove(&self, id: Uuid) -> bool {
        let mut clients = self.lock();
        match clients.iter().position(|client| client.id == id) {
            Some(index) => {
                clients.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Send `message` to every registered client.
    ///
    /// Iterates over a snapshot, so clients may connect or disconnect while
    /// a broadcast is in progress. Failed sends are ignored: the client is
    /// gone and its connection task will remove it. Returns the number of
    /// clients the message was handed to.
    pub(crate) fn broadcast(&self, message: &str) -> usize {
        let snapshot = self.lock().clone();

        snapshot
            .iter()
            .filter(|client| client.sender.send(message.to_owned()).is_ok())
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PushClient>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
