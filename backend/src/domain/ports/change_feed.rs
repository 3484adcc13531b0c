//! Port for live change notifications.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::record::Collection;

/// A document in `collection` was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionChange {
    pub collection: Collection,
    pub id: Uuid,
}

/// Fan-out of document writes to live subscribers.
///
/// Subscribers that fall behind observe `RecvError::Lagged` and must
/// re-query the collections they watch.
#[cfg_attr(test, mockall::automock)]
pub trait ChangeFeed: Send + Sync {
    /// Announce a write. Publishing without subscribers is not an error.
    fn publish(&self, change: CollectionChange);

    fn subscribe(&self) -> broadcast::Receiver<CollectionChange>;
}
