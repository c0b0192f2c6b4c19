//! Progress event bus.
//!
//! Replaces the distilled source's `tqdm` progress bar with a subscribable,
//! UI-agnostic signal, built the same way the corpus's kernel IPC bus is:
//! a thin wrapper over [`tokio::sync::broadcast`].

use std::sync::Arc;

use tokio::sync::broadcast;

/// A progress update published each time the Result Collector records a
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Number of indices completed so far.
    pub completed: usize,
    /// Total number of indices in the session.
    pub total: usize,
}

/// Publish/subscribe bus for [`Progress`] events.
///
/// Cheaply cloneable and `Send + Sync`. If there are no subscribers,
/// publishing is a no-op rather than an error -- progress reporting is
/// best-effort and never on the critical path.
#[derive(Clone)]
pub struct ProgressBus {
    sender: broadcast::Sender<Arc<Progress>>,
}

impl ProgressBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a progress update to all current subscribers.
    pub fn publish(&self, progress: Progress) {
        let _ = self.sender.send(Arc::new(progress));
    }

    /// Subscribe to future progress updates. Events published before this
    /// call are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Progress>> {
        self.sender.subscribe()
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = ProgressBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Progress {
            completed: 1,
            total: 10,
        });

        let received = rx.recv().await.unwrap();
        assert_eq!(received.completed, 1);
        assert_eq!(received.total, 10);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = ProgressBus::new(16);
        bus.publish(Progress {
            completed: 1,
            total: 1,
        });
    }
}
