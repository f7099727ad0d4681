//! Collection request backend library.
//!
//! Hexagonal layout: [`domain`] holds the model, use cases, and ports;
//! [`inbound`] exposes them over HTTP; [`outbound`] implements the ports
//! against the JSON record document and notification webhooks.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
