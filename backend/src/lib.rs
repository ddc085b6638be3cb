//! Promo Plan backend library.
//!
//! Hexagonal layout: `domain` holds the entities, validation, and ports;
//! `inbound` exposes the REST API; `outbound` implements the ports
//! against PostgreSQL and the file store.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

#[cfg(feature = "test-support")]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
