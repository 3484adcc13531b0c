//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Every collection lives in one `documents` table with a JSONB body.
//! Diesel row structs (`models.rs`) and the table definition (`schema.rs`)
//! stay private to this module.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselDocumentStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/alumni")).await?;
//! let store = DieselDocumentStore::new(pool);
//! ```

mod diesel_document_store;
mod diesel_error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_document_store::DieselDocumentStore;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
