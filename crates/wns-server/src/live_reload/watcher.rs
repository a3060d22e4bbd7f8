//! Filesystem change watcher.
//!
//! Wraps a `notify` watcher over one or more directories and feeds every raw
//! change event into a [`Debouncer`]. Subscribers receive one [`Changed`]
//! per quiescent burst.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use notify::event::{AccessKind, AccessMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use super::debouncer::{Changed, Debouncer};
use crate::error::ServerError;

/// Default debounce interval.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Capacity of the raw event queue between the notify thread and the runtime.
const RAW_EVENT_CAPACITY: usize = 100;

/// Capacity of the change notification channel.
const NOTIFICATION_CAPACITY: usize = 16;

/// Watches directories and emits debounced change notifications.
pub struct ChangeWatcher {
    dirs: Vec<PathBuf>,
    debounce: Duration,
    cancel: CancellationToken,
    active: Arc<AtomicBool>,
    started: bool,
    notifier: broadcast::Sender<Changed>,
}

impl ChangeWatcher {
    /// Create a watcher over `dirs`. Nothing is watched until [`start`](Self::start).
    #[must_use]
    pub fn new(dirs: Vec<PathBuf>, debounce: Duration) -> Self {
        let (notifier, _rx) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            dirs,
            debounce,
            cancel: CancellationToken::new(),
            active: Arc::new(AtomicBool::new(false)),
            started: false,
            notifier,
        }
    }

    /// Stop watching when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Start watching.
    ///
    /// Spawns a background task that drains raw events from the notify
    /// thread into the debouncer until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if called twice or if the underlying watcher cannot
    /// be created or registered for one of the directories.
    pub fn start(&mut self) -> Result<(), ServerError> {
        if self.started {
            return Err(ServerError::AlreadyStarted);
        }

        let (tx, mut rx) = mpsc::channel::<notify::Result<Event>>(RAW_EVENT_CAPACITY);

        // The callback runs on notify's own thread, so blocking is fine.
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        for dir in &self.dirs {
            watcher.watch(dir, RecursiveMode::Recursive)?;
            tracing::info!(dir = %dir.display(), "Watching for changes");
        }

        self.started = true;
        self.active.store(true, Ordering::SeqCst);

        let debouncer = Debouncer::new(self.debounce, self.notifier.clone());
        let cancel = self.cancel.clone();
        let active = Arc::clone(&self.active);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        tracing::info!("Watch aborted");
                        break;
                    }
                    res = rx.recv() => match res {
                        Some(Ok(event)) => record_event(&event, &debouncer),
                        Some(Err(err)) => {
                            tracing::warn!(error = %err, "Filesystem watcher error");
                        }
                        None => {
                            tracing::warn!("Filesystem watcher stream ended");
                            break;
                        }
                    }
                }
            }

            active.store(false, Ordering::SeqCst);
            drop(watcher);
            tracing::debug!("Released filesystem watcher");
        });

        Ok(())
    }

    /// Stop watching. Pending debounce callbacks still run.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.cancel.cancel();
    }

    /// Whether the watcher is currently monitoring.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Subscribe to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Changed> {
        self.notifier.subscribe()
    }
}

/// Record a raw filesystem event into the debouncer.
fn record_event(event: &Event, debouncer: &Debouncer) {
    if is_read_only(&event.kind) {
        return;
    }

    tracing::debug!(kind = ?event.kind, paths = ?event.paths, "Recorded filesystem event");
    debouncer.record();
}

/// Whether an event only reports a file being read.
///
/// Serving a page opens and reads it, which must not reload that page.
/// Closing a file opened for writing still counts as a change.
fn is_read_only(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Access(
            AccessKind::Read | AccessKind::Open(_) | AccessKind::Close(AccessMode::Read)
        )
    )
}

#[cfg(test)]
mod tests {
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};

    use super::*;

    #[test]
    fn test_reads_are_not_changes() {
        assert!(is_read_only(&EventKind::Access(AccessKind::Read)));
        assert!(is_read_only(&EventKind::Access(AccessKind::Open(AccessMode::Any))));
        assert!(is_read_only(&EventKind::Access(AccessKind::Close(AccessMode::Read))));
    }

    #[test]
    fn test_writes_are_changes() {
        assert!(!is_read_only(&EventKind::Access(AccessKind::Close(AccessMode::Write))));
        assert!(!is_read_only(&EventKind::Create(CreateKind::File)));
        assert!(!is_read_only(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
        assert!(!is_read_only(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_read_only(&EventKind::Any));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_after_write_triggers_change() {
        let (tx, mut rx) = broadcast::channel(4);
        let debouncer = Debouncer::new(DEFAULT_DEBOUNCE, tx);

        record_event(
            &Event::new(EventKind::Access(AccessKind::Open(AccessMode::Any))),
            &debouncer,
        );
        tokio::time::sleep(DEFAULT_DEBOUNCE * 2).await;
        assert!(rx.try_recv().is_err());

        record_event(
            &Event::new(EventKind::Access(AccessKind::Close(AccessMode::Write))),
            &debouncer,
        );
        assert_eq!(rx.recv().await.unwrap(), Changed);
    }

    #[tokio::test]
    async fn test_not_active_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = ChangeWatcher::new(vec![dir.path().to_path_buf()], DEFAULT_DEBOUNCE);

        assert!(!watcher.is_active());
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = ChangeWatcher::new(vec![dir.path().to_path_buf()], DEFAULT_DEBOUNCE);

        watcher.start().unwrap();
        assert!(watcher.is_active());
        assert!(matches!(watcher.start(), Err(ServerError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn test_start_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let mut watcher = ChangeWatcher::new(vec![missing], DEFAULT_DEBOUNCE);

        assert!(matches!(watcher.start(), Err(ServerError::Watch(_))));
        assert!(!watcher.is_active());
    }

    #[tokio::test]
    async fn test_cancellation_deactivates() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        let mut watcher = ChangeWatcher::new(vec![dir.path().to_path_buf()], DEFAULT_DEBOUNCE)
            .with_cancellation(token.clone());

        watcher.start().unwrap();
        token.cancel();

        tokio::time::timeout(Duration::from_secs(5), async {
            while watcher.is_active() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_stop_deactivates_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = ChangeWatcher::new(vec![dir.path().to_path_buf()], DEFAULT_DEBOUNCE);

        watcher.start().unwrap();
        watcher.stop();

        assert!(!watcher.is_active());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_file_write_emits_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher =
            ChangeWatcher::new(vec![dir.path().to_path_buf()], Duration::from_millis(50));
        let mut rx = watcher.subscribe();

        watcher.start().unwrap();
        std::fs::write(dir.path().join("page.html"), "<html></html>").unwrap();

        let changed = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(changed, Changed);
    }
}
