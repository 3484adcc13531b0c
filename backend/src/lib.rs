//! Alumni association platform backend.
//!
//! Layers follow a hexagonal split: `domain` holds entities, services and
//! ports; `outbound` implements the driven ports (PostgreSQL, memory,
//! email, hashing); `inbound` exposes HTTP and WebSocket adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
