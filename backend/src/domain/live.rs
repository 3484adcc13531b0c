//! Live toasts for newly published events, jobs and donations.
//!
//! Every subscription keeps one listener per kind. A listener's first
//! snapshot only records which documents already exist; later snapshots
//! yield a toast for each eligible document not seen before. Watermarks are
//! id sets, so re-querying after a lagged change feed never repeats a toast.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ports::{ChangeFeed, CollectionChange, ToastFeed, ToastStream};
use super::record::Record;
use super::repository::{Collections, Repository};
use super::{Collection, Donation, Error, Event, JobPosting, Moderated, ModerationStatus};

use std::sync::Arc;

/// Kinds of content that raise toasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Event,
    Job,
    Donation,
}

impl ToastKind {
    const ALL: [Self; 3] = [Self::Event, Self::Job, Self::Donation];

    const fn collection(self) -> Collection {
        match self {
            Self::Event => Collection::Events,
            Self::Job => Collection::JobPostings,
            Self::Donation => Collection::Donations,
        }
    }

    fn for_collection(collection: Collection) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection() == collection)
    }
}

/// Ephemeral notification pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub kind: ToastKind,
    pub id: Uuid,
    pub message: String,
}

/// Id watermark implementing "first snapshot is the baseline".
///
/// # Examples
/// ```
/// use backend::domain::SnapshotWatermark;
/// use uuid::Uuid;
///
/// let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
/// let mut watermark = SnapshotWatermark::default();
/// assert!(watermark.observe([a]).is_empty());
/// assert_eq!(watermark.observe([a, b]), vec![b]);
/// assert!(watermark.observe([a, b]).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnapshotWatermark {
    primed: bool,
    seen: HashSet<Uuid>,
}

impl SnapshotWatermark {
    /// Record a snapshot and return ids not seen in any earlier one.
    pub fn observe(&mut self, snapshot: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
        if !self.primed {
            self.primed = true;
            self.seen.extend(snapshot);
            return Vec::new();
        }
        snapshot
            .into_iter()
            .filter(|id| self.seen.insert(*id))
            .collect()
    }

    #[must_use]
    pub fn is_primed(&self) -> bool {
        self.primed
    }
}

/// Content eligible for toasts.
trait Toastable: Moderated {
    const TOAST: ToastKind;

    fn eligible(&self) -> bool {
        !self.is_deleted() && self.status() == ModerationStatus::Approved
    }
}

impl Toastable for Event {
    const TOAST: ToastKind = ToastKind::Event;
}

impl Toastable for JobPosting {
    const TOAST: ToastKind = ToastKind::Job;
}

impl Toastable for Donation {
    const TOAST: ToastKind = ToastKind::Donation;

    fn eligible(&self) -> bool {
        !self.is_deleted() && self.status() != ModerationStatus::Rejected
    }
}

struct Listener<T> {
    records: Repository<T>,
    watermark: SnapshotWatermark,
}

impl<T: Toastable> Listener<T> {
    fn new(records: Repository<T>) -> Self {
        Self {
            records,
            watermark: SnapshotWatermark::default(),
        }
    }

    /// Take a snapshot and append toasts for newly eligible records.
    async fn refresh(&mut self, out: &mut VecDeque<Toast>) -> Result<(), Error> {
        let eligible: Vec<T> = self
            .records
            .list()
            .await?
            .into_iter()
            .filter(Toastable::eligible)
            .collect();
        let fresh: HashSet<Uuid> = self
            .watermark
            .observe(eligible.iter().map(Record::id))
            .into_iter()
            .collect();
        out.extend(
            eligible
                .iter()
                .filter(|record| fresh.contains(&record.id()))
                .map(|record| Toast {
                    kind: T::TOAST,
                    id: record.id(),
                    message: record.headline(),
                }),
        );
        Ok(())
    }
}

/// [`ToastFeed`] over the change feed and the content collections.
#[derive(Clone)]
pub struct LiveToastFeed {
    collections: Collections,
    feed: Arc<dyn ChangeFeed>,
}

impl LiveToastFeed {
    #[must_use]
    pub fn new(collections: &Collections) -> Self {
        Self {
            collections: collections.clone(),
            feed: collections.feed(),
        }
    }

    /// Concrete subscription; the trait method boxes this.
    pub async fn open(&self) -> Result<ToastSubscription, Error> {
        let changes = self.feed.subscribe();
        let mut subscription = ToastSubscription {
            changes,
            events: Listener::new(self.collections.repository()),
            jobs: Listener::new(self.collections.repository()),
            donations: Listener::new(self.collections.repository()),
            pending: VecDeque::new(),
        };
        for kind in ToastKind::ALL {
            subscription.refresh(kind).await?;
        }
        debug!(queued = subscription.pending.len(), "toast subscription primed");
        Ok(subscription)
    }
}

#[async_trait]
impl ToastFeed for LiveToastFeed {
    async fn subscribe(&self) -> Result<Box<dyn ToastStream>, Error> {
        Ok(Box::new(self.open().await?))
    }
}

/// One client's view of the live feed.
pub struct ToastSubscription {
    changes: broadcast::Receiver<CollectionChange>,
    events: Listener<Event>,
    jobs: Listener<JobPosting>,
    donations: Listener<Donation>,
    pending: VecDeque<Toast>,
}

impl ToastSubscription {
    async fn refresh(&mut self, kind: ToastKind) -> Result<(), Error> {
        match kind {
            ToastKind::Event => self.events.refresh(&mut self.pending).await,
            ToastKind::Job => self.jobs.refresh(&mut self.pending).await,
            ToastKind::Donation => self.donations.refresh(&mut self.pending).await,
        }
    }

    async fn refresh_logged(&mut self, kind: ToastKind) {
        if let Err(err) = self.refresh(kind).await {
            warn!(?kind, error = %err, "toast listener refresh failed");
        }
    }
}

#[async_trait]
impl ToastStream for ToastSubscription {
    async fn next_toast(&mut self) -> Option<Toast> {
        loop {
            if let Some(toast) = self.pending.pop_front() {
                return Some(toast);
            }
            match self.changes.recv().await {
                Ok(change) => {
                    if let Some(kind) = ToastKind::for_collection(change.collection) {
                        self.refresh_logged(kind).await;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "toast subscription lagged; re-querying");
                    for kind in ToastKind::ALL {
                        self.refresh_logged(kind).await;
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
