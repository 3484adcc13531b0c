//! Change feed backed by a tokio broadcast channel.

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::ports::{ChangeFeed, CollectionChange};

/// Default number of buffered changes per subscriber.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// In-process [`ChangeFeed`]. Slow subscribers lag rather than block writers.
#[derive(Debug, Clone)]
pub struct BroadcastChangeFeed {
    sender: broadcast::Sender<CollectionChange>,
}

impl BroadcastChangeFeed {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

impl Default for BroadcastChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl ChangeFeed for BroadcastChangeFeed {
    fn publish(&self, change: CollectionChange) {
        if self.sender.send(change).is_err() {
            trace!(collection = %change.collection, "change published without subscribers");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<CollectionChange> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Collection;
    use tokio::sync::broadcast::error::RecvError;
    use uuid::Uuid;

    fn change() -> CollectionChange {
        CollectionChange {
            collection: Collection::Events,
            id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn subscribers_receive_changes_published_after_subscribing() {
        let feed = BroadcastChangeFeed::default();
        let mut receiver = feed.subscribe();
        let sent = change();
        feed.publish(sent);
        assert_eq!(receiver.recv().await.expect("change"), sent);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        BroadcastChangeFeed::default().publish(change());
    }

    #[tokio::test]
    async fn slow_subscribers_observe_lag() {
        let feed = BroadcastChangeFeed::new(1);
        let mut receiver = feed.subscribe();
        feed.publish(change());
        feed.publish(change());
        assert!(matches!(receiver.recv().await, Err(RecvError::Lagged(1))));
    }
}
