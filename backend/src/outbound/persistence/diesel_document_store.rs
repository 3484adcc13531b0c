//! PostgreSQL [`DocumentStore`] over a single JSONB `documents` table.

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Jsonb, Text};
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::Collection;
use crate::domain::ports::{Document, DocumentQuery, DocumentStore, DocumentStoreError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, map_write_error};
use super::models::DocumentRow;
use super::pool::DbPool;
use super::schema::documents;

/// Diesel-backed document store.
#[derive(Clone)]
pub struct DieselDocumentStore {
    pool: DbPool,
}

impl DieselDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Translate a [`DocumentQuery`] into a boxed select.
///
/// Field filters compare `body -> field` against a JSONB literal, which is
/// exact JSON equality just like the in-memory store.
fn select_query(
    collection: Collection,
    query: &DocumentQuery,
) -> documents::BoxedQuery<'static, Pg> {
    let mut statement = documents::table
        .filter(documents::collection.eq(collection.as_str()))
        .into_boxed();
    if !query.include_deleted {
        statement = statement.filter(documents::deleted_at.is_null());
    }
    for filter in &query.filters {
        statement = statement.filter(
            sql::<Bool>("body -> ")
                .bind::<Text, _>(filter.field.clone())
                .sql(" = ")
                .bind::<Jsonb, _>(filter.value.clone()),
        );
    }
    statement.order((documents::created_at.asc(), documents::id.asc()))
}

#[async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn insert(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = DocumentRow::from_document(collection, document);
        diesel::insert_into(documents::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_write_error(collection.as_str(), document.id))
    }

    async fn upsert(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = DocumentRow::from_document(collection, document);
        diesel::insert_into(documents::table)
            .values(&row)
            .on_conflict((documents::collection, documents::id))
            .do_update()
            .set((
                documents::body.eq(excluded(documents::body)),
                documents::updated_at.eq(excluded(documents::updated_at)),
                documents::deleted_at.eq(excluded(documents::deleted_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_write_error(collection.as_str(), document.id))
    }

    async fn fetch(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        documents::table
            .filter(documents::collection.eq(collection.as_str()))
            .filter(documents::id.eq(id))
            .select(DocumentRow::as_select())
            .first::<DocumentRow>(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Document::from))
            .map_err(map_diesel_error)
    }

    async fn query(
        &self,
        collection: Collection,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        select_query(collection, query)
            .select(DocumentRow::as_select())
            .load::<DocumentRow>(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Document::from).collect())
            .map_err(map_diesel_error)
    }
}
