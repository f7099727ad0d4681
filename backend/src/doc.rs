//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the collection request endpoints and the health probes
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`CollectionRequestSchema`]) that provide OpenAPI definitions without
//!   coupling domain types to the utoipa framework, plus the request bodies
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::collectes::{CreateCollectionRequestBody, UpdateStatusBody};
use crate::inbound::http::schemas::{CollectionRequestSchema, ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Collection request API",
        description = "Submit can collection requests, list them, and track their status."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::collectes::list_collection_requests,
        crate::inbound::http::collectes::create_collection_request,
        crate::inbound::http::collectes::update_collection_request_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CollectionRequestSchema,
        CreateCollectionRequestBody,
        UpdateStatusBody,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "collectes", description = "Collection request intake and follow-up"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
