//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL document store using Diesel ORM
//! - **memory**: in-process document store for development and tests
//! - **feed**: tokio broadcast change feed
//! - **security**: Argon2 password hashing
//! - **email**: EmailJS-compatible HTTP client and a logging fallback
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod email;
pub mod feed;
pub mod memory;
pub mod persistence;
pub mod security;
