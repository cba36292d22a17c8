//! League backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds entities, the
//! scheduling and live-scoring services, and the ports they drive;
//! `inbound` adapts HTTP requests onto the driving ports; `outbound`
//! implements the driven ports against PostgreSQL and the webhook sink.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
