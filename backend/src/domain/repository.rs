//! Typed access to document collections.
//!
//! [`Repository`] converts records to and from stored documents, hides
//! soft-deleted records from ordinary reads, and announces every write on the
//! change feed.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use super::Error;
use super::ports::{ChangeFeed, CollectionChange, Document, DocumentQuery, DocumentStore, DocumentStoreError};
use super::record::Record;

/// Shared handles used to build repositories.
#[derive(Clone)]
pub struct Collections {
    store: Arc<dyn DocumentStore>,
    feed: Arc<dyn ChangeFeed>,
}

impl Collections {
    pub fn new(store: Arc<dyn DocumentStore>, feed: Arc<dyn ChangeFeed>) -> Self {
        Self { store, feed }
    }

    /// Repository over the collection of `T`.
    #[must_use]
    pub fn repository<T: Record>(&self) -> Repository<T> {
        Repository::new(self.store.clone(), self.feed.clone())
    }

    #[must_use]
    pub fn feed(&self) -> Arc<dyn ChangeFeed> {
        self.feed.clone()
    }
}

/// Typed repository over one collection.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    feed: Arc<dyn ChangeFeed>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            feed: self.feed.clone(),
            _record: PhantomData,
        }
    }
}

pub(crate) fn map_store_error(error: DocumentStoreError) -> Error {
    match error {
        DocumentStoreError::Connection { message } => {
            Error::service_unavailable(format!("document store unavailable: {message}"))
        }
        DocumentStoreError::Query { message } => {
            Error::internal(format!("document store error: {message}"))
        }
        DocumentStoreError::Serialization { message } => {
            Error::internal(format!("document encoding error: {message}"))
        }
        DocumentStoreError::Conflict { collection, id } => {
            Error::conflict(format!("record {id} already exists in {collection}"))
        }
    }
}

fn encode<T: Record>(record: &T) -> Result<Document, Error> {
    let body = serde_json::to_value(record)
        .map_err(|err| Error::internal(format!("failed to encode {}: {err}", T::COLLECTION)))?;
    Ok(Document {
        id: record.id(),
        body,
        created_at: record.created_at(),
        updated_at: record.updated_at(),
        deleted_at: record.deleted_at(),
    })
}

fn decode<T: Record>(document: Document) -> Result<T, Error> {
    serde_json::from_value(document.body).map_err(|err| {
        Error::internal(format!(
            "stored {} document {} is malformed: {err}",
            T::COLLECTION,
            document.id
        ))
    })
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>, feed: Arc<dyn ChangeFeed>) -> Self {
        Self {
            store,
            feed,
            _record: PhantomData,
        }
    }

    fn announce(&self, id: Uuid) {
        self.feed.publish(CollectionChange {
            collection: T::COLLECTION,
            id,
        });
    }

    /// Store a new record; fails with `conflict` if the id is taken.
    pub async fn insert(&self, record: &T) -> Result<(), Error> {
        let document = encode(record)?;
        self.store
            .insert(T::COLLECTION, &document)
            .await
            .map_err(map_store_error)?;
        self.announce(record.id());
        Ok(())
    }

    /// Create or replace a record (last write wins).
    pub async fn save(&self, record: &T) -> Result<(), Error> {
        let document = encode(record)?;
        self.store
            .upsert(T::COLLECTION, &document)
            .await
            .map_err(map_store_error)?;
        self.announce(record.id());
        Ok(())
    }

    /// Fetch a live record.
    pub async fn find(&self, id: Uuid) -> Result<Option<T>, Error> {
        Ok(self
            .find_including_deleted(id)
            .await?
            .filter(|record| !record.is_deleted()))
    }

    /// Fetch a record even when soft-deleted.
    pub async fn find_including_deleted(&self, id: Uuid) -> Result<Option<T>, Error> {
        self.store
            .fetch(T::COLLECTION, id)
            .await
            .map_err(map_store_error)?
            .map(decode)
            .transpose()
    }

    /// Fetch a live record or fail with `not_found`.
    pub async fn get(&self, id: Uuid) -> Result<T, Error> {
        self.find(id).await?.ok_or_else(|| {
            Error::not_found(format!("{} record {id} not found", T::COLLECTION))
        })
    }

    /// Every live record, oldest first.
    pub async fn list(&self) -> Result<Vec<T>, Error> {
        self.query(&DocumentQuery::live()).await
    }

    /// Live records whose `field` equals `value`.
    pub async fn list_where(&self, field: &str, value: impl Serialize) -> Result<Vec<T>, Error> {
        let value = to_filter_value(value)?;
        self.query(&DocumentQuery::live().with_eq(field, value)).await
    }

    pub async fn query(&self, query: &DocumentQuery) -> Result<Vec<T>, Error> {
        let documents = self
            .store
            .query(T::COLLECTION, query)
            .await
            .map_err(map_store_error)?;
        documents.into_iter().map(decode).collect()
    }

    /// Save a linked record, logging the failure with `context` before
    /// returning it.
    pub async fn save_logged(&self, record: &T, context: &str) -> Result<(), Error> {
        self.save(record).await.inspect_err(|err| {
            warn!(
                collection = %T::COLLECTION,
                id = %record.id(),
                context,
                error = %err,
                "linked record sync failed"
            );
        })
    }
}

/// Encode a filter operand as JSON.
pub fn to_filter_value(value: impl Serialize) -> Result<Value, Error> {
    serde_json::to_value(value)
        .map_err(|err| Error::internal(format!("failed to encode filter value: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockChangeFeed, MockDocumentStore};
    use crate::domain::{AlumniId, AlumniRecord};
    use chrono::Utc;
    use rstest::rstest;

    fn record() -> AlumniRecord {
        AlumniRecord::new(
            "Ana Reyes".into(),
            "ana@example.com".into(),
            2004,
            AlumniId::parse("123456-A").expect("valid id"),
            Utc::now(),
        )
    }

    #[rstest]
    #[case(DocumentStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(DocumentStoreError::query("syntax"), ErrorCode::InternalError)]
    #[case(DocumentStoreError::serialization("bad json"), ErrorCode::InternalError)]
    #[case(DocumentStoreError::conflict("users", Uuid::nil()), ErrorCode::Conflict)]
    fn store_errors_map_to_domain_codes(
        #[case] error: DocumentStoreError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_store_error(error).code(), expected);
    }

    #[tokio::test]
    async fn insert_publishes_change() {
        let mut store = MockDocumentStore::new();
        store.expect_insert().times(1).returning(|_, _| Ok(()));
        let mut feed = MockChangeFeed::new();
        feed.expect_publish()
            .withf(|change| change.collection == crate::domain::Collection::AlumniRecords)
            .times(1)
            .return_const(());
        let repo: Repository<AlumniRecord> = Repository::new(Arc::new(store), Arc::new(feed));

        repo.insert(&record()).await.expect("insert succeeds");
    }

    #[tokio::test]
    async fn failed_write_does_not_publish() {
        let mut store = MockDocumentStore::new();
        store
            .expect_upsert()
            .returning(|_, _| Err(DocumentStoreError::connection("down")));
        let mut feed = MockChangeFeed::new();
        feed.expect_publish().times(0);
        let repo: Repository<AlumniRecord> = Repository::new(Arc::new(store), Arc::new(feed));

        let err = repo.save(&record()).await.expect_err("save fails");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn find_hides_soft_deleted_records() {
        let mut deleted = record();
        deleted.deleted_at = Some(Utc::now());
        let document = encode(&deleted).expect("encode");
        let mut store = MockDocumentStore::new();
        store
            .expect_fetch()
            .returning(move |_, _| Ok(Some(document.clone())));
        let repo: Repository<AlumniRecord> =
            Repository::new(Arc::new(store), Arc::new(MockChangeFeed::new()));

        assert!(repo.find(deleted.id).await.expect("fetch").is_none());
        assert!(
            repo.find_including_deleted(deleted.id)
                .await
                .expect("fetch")
                .is_some()
        );
    }
}
