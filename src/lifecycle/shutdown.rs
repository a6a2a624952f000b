//! One-shot stop signal shared by the server and the signal listener.

use tokio::sync::broadcast;

/// Fans a single stop request out to everything serving traffic.
///
/// `main` owns one; the signal task holds a clone to fire it and the HTTP
/// server holds a receiver, which ends `axum::serve` and lets in-flight
/// requests (and their response log events) finish.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver that wakes on the next `trigger`. Subscribe before
    /// spawning the task that waits on it.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscriber to stop. Firing with no subscribers is a no-op.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Receivers still alive, i.e. tasks that have not yet stopped.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
