//! Event debouncing for live reload.
//!
//! Collapses bursts of raw filesystem events into a single [`Changed`]
//! notification. Every recorded event schedules its own deferred callback
//! `delay` after its arrival; the notification fires when the last pending
//! callback of a burst runs. Quiescence is therefore measured from the most
//! recent event of the burst, not from a single resettable timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;

/// Notification that something under the watched directories changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Changed;

/// Counter-based trailing debouncer.
///
/// Cheap to clone; clones share the same counter and notification channel.
#[derive(Clone, Debug)]
pub(crate) struct Debouncer {
    outstanding: Arc<AtomicUsize>,
    delay: Duration,
    notifier: broadcast::Sender<Changed>,
}

impl Debouncer {
    /// Create a debouncer that emits on `notifier` after `delay` of quiet.
    pub(crate) fn new(delay: Duration, notifier: broadcast::Sender<Changed>) -> Self {
        Self {
            outstanding: Arc::new(AtomicUsize::new(0)),
            delay,
            notifier,
        }
    }

    /// Record one raw event.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn record(&self) {
        let deadline = Instant::now() + self.delay;
        self.outstanding.fetch_add(1, Ordering::SeqCst);

        let debouncer = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            debouncer.settle();
        });
    }

    /// Run one deferred callback.
    fn settle(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            // No subscribers is fine, nobody is listening yet.
            let _ = self.notifier.send(Changed);
            tracing::debug!("Burst settled, change notification emitted");
        }
    }

    /// Number of deferred callbacks that have not run yet.
    #[cfg(test)]
    fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::time::{advance, sleep, sleep_until};

    const DELAY: Duration = Duration::from_millis(200);

    fn debouncer() -> (Debouncer, broadcast::Receiver<Changed>) {
        let (tx, rx) = broadcast::channel(16);
        (Debouncer::new(DELAY, tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_event_fires_after_delay() {
        let (debouncer, mut rx) = debouncer();
        let start = Instant::now();

        debouncer.record();
        assert_eq!(debouncer.outstanding(), 1);

        assert_eq!(rx.recv().await.unwrap(), Changed);
        let elapsed = start.elapsed();
        assert!(elapsed >= DELAY, "fired early: {elapsed:?}");
        assert!(elapsed < DELAY + Duration::from_millis(5), "fired late: {elapsed:?}");
        assert_eq!(debouncer.outstanding(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once_after_last_event() {
        let (debouncer, mut rx) = debouncer();
        let start = Instant::now();

        debouncer.record();
        sleep_until(start + Duration::from_millis(50)).await;
        debouncer.record();
        sleep_until(start + Duration::from_millis(120)).await;
        debouncer.record();

        // The first event's own deadline passes without a notification.
        sleep_until(start + Duration::from_millis(201)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(debouncer.outstanding(), 2);

        sleep_until(start + Duration::from_millis(251)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(debouncer.outstanding(), 1);

        assert_eq!(rx.recv().await.unwrap(), Changed);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(320), "fired early: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(325), "fired late: {elapsed:?}");

        // Exactly one notification for the whole burst.
        sleep(Duration::from_secs(1)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (debouncer, mut rx) = debouncer();

        debouncer.record();
        sleep(Duration::from_millis(300)).await;
        assert_eq!(rx.try_recv(), Ok(Changed));

        debouncer.record();
        sleep(Duration::from_millis(300)).await;
        assert_eq!(rx.try_recv(), Ok(Changed));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_during_drain_extends_burst() {
        let (debouncer, mut rx) = debouncer();
        let start = Instant::now();

        debouncer.record();
        advance(Duration::from_millis(100)).await;
        debouncer.record();

        // First callback has run, counter dropped to 1 but not to 0.
        sleep_until(start + Duration::from_millis(250)).await;
        assert_eq!(debouncer.outstanding(), 1);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        debouncer.record();
        sleep_until(start + Duration::from_millis(301)).await;
        assert_eq!(debouncer.outstanding(), 1);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        sleep_until(start + Duration::from_millis(451)).await;
        assert_eq!(rx.try_recv(), Ok(Changed));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_subscriber_is_notified() {
        let (debouncer, mut first) = debouncer();
        let mut second = debouncer.notifier.subscribe();

        debouncer.record();

        assert_eq!(first.recv().await.unwrap(), Changed);
        assert_eq!(second.recv().await.unwrap(), Changed);
    }
}
