//! In-memory document store used when no database is configured.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Collection;
use crate::domain::ports::{Document, DocumentQuery, DocumentStore, DocumentStoreError};

type Documents = HashMap<Collection, HashMap<Uuid, Document>>;

/// Process-local [`DocumentStore`]; contents vanish on restart.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Documents>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Documents>, DocumentStoreError> {
        self.documents
            .read()
            .map_err(|_| DocumentStoreError::connection("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Documents>, DocumentStoreError> {
        self.documents
            .write()
            .map_err(|_| DocumentStoreError::connection("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), DocumentStoreError> {
        let mut guard = self.write()?;
        let documents = guard.entry(collection).or_default();
        if documents.contains_key(&document.id) {
            return Err(DocumentStoreError::conflict(collection.as_str(), document.id));
        }
        documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn upsert(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), DocumentStoreError> {
        let mut guard = self.write()?;
        let documents = guard.entry(collection).or_default();
        let created_at = documents
            .get(&document.id)
            .map_or(document.created_at, |existing| existing.created_at);
        documents.insert(
            document.id,
            Document {
                created_at,
                ..document.clone()
            },
        );
        Ok(())
    }

    async fn fetch(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let guard = self.read()?;
        Ok(guard
            .get(&collection)
            .and_then(|documents| documents.get(&id))
            .cloned())
    }

    async fn query(
        &self,
        collection: Collection,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let guard = self.read()?;
        let mut matches: Vec<Document> = guard
            .get(&collection)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| query.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn document(name: &str, offset_secs: i64) -> Document {
        let at = Utc::now() + Duration::seconds(offset_secs);
        Document {
            id: Uuid::new_v4(),
            body: json!({ "name": name }),
            created_at: at,
            updated_at: at,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = InMemoryDocumentStore::new();
        let doc = document("a", 0);
        store.insert(Collection::Users, &doc).await.expect("first insert");
        let err = store
            .insert(Collection::Users, &doc)
            .await
            .expect_err("duplicate");
        assert!(matches!(err, DocumentStoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = InMemoryDocumentStore::new();
        let doc = document("a", 0);
        store.insert(Collection::Users, &doc).await.expect("insert");
        let found = store
            .fetch(Collection::AlumniRecords, doc.id)
            .await
            .expect("fetch");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn query_orders_by_creation_time() {
        let store = InMemoryDocumentStore::new();
        let later = document("later", 10);
        let earlier = document("earlier", 0);
        store.insert(Collection::Events, &later).await.expect("insert");
        store.insert(Collection::Events, &earlier).await.expect("insert");

        let results = store
            .query(Collection::Events, &DocumentQuery::live())
            .await
            .expect("query");
        let names: Vec<_> = results
            .iter()
            .filter_map(|doc| doc.body.get("name").and_then(|v| v.as_str()))
            .collect();
        assert_eq!(names, vec!["earlier", "later"]);
    }

    #[tokio::test]
    async fn upsert_keeps_original_creation_time() {
        let store = InMemoryDocumentStore::new();
        let original = document("a", 0);
        store.insert(Collection::Users, &original).await.expect("insert");
        let replacement = Document {
            created_at: original.created_at + Duration::hours(1),
            body: json!({ "name": "b" }),
            ..original.clone()
        };
        store.upsert(Collection::Users, &replacement).await.expect("upsert");

        let stored = store
            .fetch(Collection::Users, original.id)
            .await
            .expect("fetch")
            .expect("present");
        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(stored.body, json!({ "name": "b" }));
    }
}
