//! Fan-out of reload signals to connected streaming clients.
//!
//! The registry uses a parking_lot RwLock: [`Broadcaster::notify`] only takes
//! the read side, subscription changes take the write side.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Pending notifications a subscriber may hold before further ones are dropped.
pub const SUBSCRIBER_BUFFER: usize = 1;

/// Opaque identity of one subscriber channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Registry of subscriber channels.
#[derive(Debug, Default)]
pub struct Broadcaster {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<()>>>,
    next_id: AtomicU64,
}

impl Broadcaster {
    /// Create an empty broadcaster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    ///
    /// The returned [`Subscription`] unsubscribes itself when dropped.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.subscribers.write().insert(id, tx);

        tracing::debug!(subscriber = id.0, "reload subscriber registered");

        Subscription {
            id,
            rx,
            broadcaster: Arc::clone(self),
        }
    }

    /// Remove a subscriber and close its channel.
    ///
    /// The sender is dropped only after it has left the registry, so a
    /// concurrent [`notify`](Self::notify) never targets a closed channel.
    /// Returns `false` if the subscriber was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().remove(&id);
        let found = removed.is_some();
        drop(removed);

        if found {
            tracing::debug!(subscriber = id.0, "reload subscriber removed");
        }
        found
    }

    /// Deliver one notification to every subscriber without blocking.
    ///
    /// A subscriber that has not consumed its previous notification misses
    /// this one. Returns how many subscribers received it.
    pub fn notify(&self) -> usize {
        let subscribers = self.subscribers.read();
        let mut delivered = 0;

        for (id, tx) in subscribers.iter() {
            match tx.try_send(()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(())) => {
                    tracing::trace!(subscriber = id.0, "subscriber busy, notification coalesced");
                }
                Err(mpsc::error::TrySendError::Closed(())) => {
                    tracing::trace!(subscriber = id.0, "subscriber receiver already gone");
                }
            }
        }

        tracing::debug!(
            delivered,
            subscribers = subscribers.len(),
            "reload notification broadcast"
        );
        delivered
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

/// One registered subscriber channel, owned by a streaming handler.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<()>,
    broadcaster: Arc<Broadcaster>,
}

impl Subscription {
    /// Identity of this subscriber in the registry.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next notification.
    ///
    /// Returns `None` once the subscriber has been removed from the registry.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broadcaster.unsubscribe(self.id);
    }
}
