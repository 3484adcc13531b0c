//! Port for the generic document store.
//!
//! Every collection is a set of JSON documents keyed by UUID. Adapters keep
//! the soft-delete marker alongside the body so live queries can exclude
//! deleted documents without decoding them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::record::Collection;

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "document store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "document store query failed: {message}",
        /// A document body could not be encoded or decoded.
        Serialization { message: String } =>
            "document serialization failed: {message}",
        /// A document with the same id already exists.
        Conflict { collection: String, id: Uuid } =>
            "document {id} already exists in {collection}",
    }
}

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub body: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Equality match on a top-level body field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

/// Conjunction of field filters over one collection.
///
/// # Examples
/// ```
/// use backend::domain::ports::DocumentQuery;
/// use serde_json::json;
///
/// let query = DocumentQuery::live()
///     .with_eq("batchYear", json!(2004))
///     .with_eq("active", json!(true));
/// assert_eq!(query.filters.len(), 2);
/// assert!(!query.include_deleted);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<FieldFilter>,
    pub include_deleted: bool,
}

impl DocumentQuery {
    /// Query over documents that are not soft-deleted.
    #[must_use]
    pub fn live() -> Self {
        Self::default()
    }

    /// Query that also returns soft-deleted documents.
    #[must_use]
    pub fn including_deleted() -> Self {
        Self {
            filters: Vec::new(),
            include_deleted: true,
        }
    }

    #[must_use]
    pub fn with_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            value,
        });
        self
    }

    /// Whether `document` satisfies this query.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        if !self.include_deleted && document.deleted_at.is_some() {
            return false;
        }
        self.filters
            .iter()
            .all(|filter| document.body.get(&filter.field) == Some(&filter.value))
    }
}

/// Port for document persistence.
///
/// Query results are ordered by creation time, oldest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document. Fails with `Conflict` when the id exists.
    async fn insert(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), DocumentStoreError>;

    /// Create or replace a document.
    async fn upsert(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), DocumentStoreError>;

    /// Fetch a document by id, including soft-deleted ones.
    async fn fetch(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, DocumentStoreError>;

    /// Return documents matching every filter.
    async fn query(
        &self,
        collection: Collection,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, DocumentStoreError>;
}
