//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Every collection shares one table; `collection` partitions the rows.
    documents (collection, id) {
        collection -> Varchar,
        id -> Uuid,
        /// Full record as camelCase JSON.
        body -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        /// Soft-delete marker mirrored from the record body.
        deleted_at -> Nullable<Timestamptz>,
    }
}
