//! listshare backend library.
//!
//! Hexagonal layout: [`domain`] holds the list and access-record model with
//! its ports, [`outbound`] implements the driven ports, and [`inbound`]
//! exposes the driving ports over HTTP.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
