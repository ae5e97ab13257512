//! Bounded mailbox that turns bursts of watch notifications into a single
//! "run a pass now" wakeup.
//!
//! Producers hold a [`CoalescerHandle`]; the worker owns the [`Coalescer`].
//! The buffer is the only state shared between them.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::DaemonError;

/// Something happened to a watched resource. Carries no payload: the worker
/// always rescans the full catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification;

/// Notifications released by one [`Coalescer::await_batch`] call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Batch {
    pub notifications: Vec<Notification>,
    /// Set once the coalescer is closed and fully drained. A closed batch
    /// is always empty.
    pub closed: bool,
}

impl Batch {
    fn closed() -> Self {
        Self {
            notifications: Vec::new(),
            closed: true,
        }
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

/// Producer side. Cheap to clone; every clone feeds the same buffer.
#[derive(Debug, Clone)]
pub struct CoalescerHandle {
    tx: mpsc::Sender<Notification>,
    closed: CancellationToken,
}

impl CoalescerHandle {
    /// Enqueue a notification, waiting for space while the buffer is full.
    ///
    /// Fails once the coalescer has been closed.
    pub async fn submit(&self, notification: Notification) -> Result<(), DaemonError> {
        if self.closed.is_cancelled() {
            return Err(DaemonError::ChannelClosed("coalescer"));
        }
        self.tx
            .send(notification)
            .await
            .map_err(|_| DaemonError::ChannelClosed("coalescer"))
    }

    /// Stop accepting notifications. Idempotent. Anything already buffered
    /// is still released to the consumer before it sees `closed`.
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

/// Consumer side, owned by the worker loop.
#[derive(Debug)]
pub struct Coalescer {
    rx: mpsc::Receiver<Notification>,
    closed: CancellationToken,
}

enum Wake {
    Received(Option<Notification>),
    Closed,
}

impl Coalescer {
    /// Create a coalescer buffering at most `capacity` notifications.
    ///
    /// `capacity` must be non-zero.
    pub fn new(capacity: usize) -> (Coalescer, CoalescerHandle) {
        let (tx, rx) = mpsc::channel(capacity);
        let closed = CancellationToken::new();
        (
            Coalescer {
                rx,
                closed: closed.clone(),
            },
            CoalescerHandle { tx, closed },
        )
    }

    /// Resolves once [`CoalescerHandle::close`] has been called.
    pub async fn closed(&self) {
        self.closed.cancelled().await
    }

    /// Wait for at least one notification, keep absorbing for
    /// `quiet_period`, then drain everything pending.
    ///
    /// Returns a closed, empty batch once the coalescer is closed (or every
    /// handle dropped) and nothing is left in the buffer.
    pub async fn await_batch(&mut self, quiet_period: Duration) -> Batch {
        if self.closed.is_cancelled() {
            self.rx.close();
        }

        let wake = tokio::select! {
            biased;
            received = self.rx.recv() => Wake::Received(received),
            _ = self.closed.cancelled() => Wake::Closed,
        };
        let first = match wake {
            Wake::Received(received) => received,
            Wake::Closed => {
                self.rx.close();
                self.rx.recv().await
            }
        };
        let Some(first) = first else {
            return Batch::closed();
        };

        if !self.closed.is_cancelled() {
            tokio::select! {
                _ = tokio::time::sleep(quiet_period) => {}
                _ = self.closed.cancelled() => {}
            }
        }

        let mut notifications = vec![first];
        while let Ok(notification) = self.rx.try_recv() {
            notifications.push(notification);
        }
        Batch {
            notifications,
            closed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready_ok};

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn burst_within_quiet_period_is_released_as_one_batch() {
        let (mut coalescer, handle) = Coalescer::new(50);

        let producer = tokio::spawn(async move {
            for _ in 0..10 {
                handle.submit(Notification).await.expect("submit");
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });

        let batch = coalescer.await_batch(Duration::from_secs(1)).await;
        assert_eq!(batch.len(), 10);
        assert!(!batch.closed);

        producer.await.expect("producer");
        let batch = coalescer.await_batch(Duration::from_secs(1)).await;
        assert!(batch.closed, "all handles dropped and buffer drained");
        assert!(batch.is_empty());
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn notifications_after_the_window_form_the_next_batch() {
        let (mut coalescer, handle) = Coalescer::new(50);

        handle.submit(Notification).await.expect("submit");
        let first = coalescer.await_batch(Duration::from_millis(100)).await;
        assert_eq!(first.len(), 1);

        handle.submit(Notification).await.expect("submit");
        handle.submit(Notification).await.expect("submit");
        let second = coalescer.await_batch(Duration::from_millis(100)).await;
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn full_buffer_blocks_the_producer() {
        let (mut coalescer, handle) = Coalescer::new(2);
        handle.submit(Notification).await.expect("submit");
        handle.submit(Notification).await.expect("submit");

        let mut blocked = tokio_test::task::spawn(handle.submit(Notification));
        assert_pending!(blocked.poll());

        let batch = coalescer.await_batch(Duration::from_millis(1)).await;
        assert_eq!(batch.len(), 2);

        assert!(blocked.is_woken());
        assert_ready_ok!(blocked.poll());
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn close_releases_a_waiting_consumer() {
        let (mut coalescer, handle) = Coalescer::new(4);

        let waiter =
            tokio::spawn(async move { coalescer.await_batch(Duration::from_secs(5)).await });
        tokio::task::yield_now().await;

        handle.close();
        handle.close();

        let batch = waiter.await.expect("waiter");
        assert!(batch.closed);
        assert!(batch.is_empty());
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn close_drains_pending_notifications_first() {
        let (mut coalescer, handle) = Coalescer::new(4);
        handle.submit(Notification).await.expect("submit");
        handle.submit(Notification).await.expect("submit");
        handle.close();

        let batch = coalescer.await_batch(Duration::from_secs(5)).await;
        assert_eq!(batch.len(), 2);
        assert!(!batch.closed);

        let batch = coalescer.await_batch(Duration::from_secs(5)).await;
        assert!(batch.closed);
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn submit_after_close_is_rejected() {
        let (_coalescer, handle) = Coalescer::new(4);
        handle.close();
        assert!(handle.is_closed());
        assert!(matches!(
            handle.submit(Notification).await,
            Err(DaemonError::ChannelClosed("coalescer"))
        ));
    }
}
