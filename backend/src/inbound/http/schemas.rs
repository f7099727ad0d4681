//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers below mirror their wire shape for documentation only and live in
//! the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The record document cannot be read or written.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "collection request 7 not found")]
    message: String,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "5f0c8d2e-8a51-4b0e-9a55-3d4f0b8b2c11")]
    trace_id: Option<String>,
    /// Supplementary details such as the offending field.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::CollectionRequest`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CollectionRequest, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CollectionRequestSchema {
    /// Identifier, assigned as collection size plus one.
    #[schema(minimum = 1, example = 1)]
    id: u64,
    /// Requester name.
    #[schema(example = "Alice Martin")]
    nom: String,
    /// Contact phone number.
    #[schema(example = "0600000000")]
    telephone: String,
    /// City of the pickup.
    #[schema(example = "Nancy")]
    ville: String,
    /// Requester category.
    #[schema(example = "particulier")]
    type_client: String,
    /// Requested pickup slot.
    #[schema(example = "2024-06-15")]
    creneau: String,
    /// Number of bags of cans.
    #[schema(example = 5)]
    canettes: u32,
    /// Lifecycle label; `nouvelle` on creation.
    #[schema(example = "nouvelle")]
    statut: String,
    /// Creation instant (UTC, millisecond precision).
    #[schema(format = "date-time", example = "2024-06-01T09:30:00.123Z")]
    created_at: String,
}
