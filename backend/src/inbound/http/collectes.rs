//! Collection request HTTP handlers.
//!
//! ```text
//! GET   /api/collectes
//! POST  /api/collectes
//! PATCH /api/collectes/{id}/status
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CollectionRequest, CollectionRequestDraft, CollectionRequestId, CollectionStatus, Error,
    map_validation_error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{CollectionRequestSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;

/// Request payload for submitting a collection request.
///
/// Server-assigned fields (`id`, `statut`, `createdAt`) are ignored if sent.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequestBody {
    /// Requester name.
    #[schema(example = "Alice Martin")]
    pub nom: String,
    /// Contact phone number.
    #[schema(example = "0600000000")]
    pub telephone: String,
    /// City of the pickup.
    #[schema(example = "Nancy")]
    pub ville: String,
    /// Requester category.
    #[schema(example = "particulier")]
    pub type_client: String,
    /// Requested pickup slot.
    #[schema(example = "2024-06-15")]
    pub creneau: String,
    /// Number of bags of cans.
    #[schema(example = 5)]
    pub canettes: u32,
}

impl From<CreateCollectionRequestBody> for CollectionRequestDraft {
    fn from(body: CreateCollectionRequestBody) -> Self {
        let CreateCollectionRequestBody {
            nom,
            telephone,
            ville,
            type_client,
            creneau,
            canettes,
        } = body;
        Self {
            nom,
            telephone,
            ville,
            type_client,
            creneau,
            canettes,
        }
    }
}

/// Request payload for changing the status of a collection request.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusBody {
    /// New lifecycle label, e.g. `planifiée` or `collectée`.
    #[schema(example = "planifiée")]
    pub statut: String,
}

/// List every collection request, newest first.
#[utoipa::path(
    get,
    path = "/api/collectes",
    tags = ["collectes"],
    responses(
        (status = 200, description = "Stored collection requests", body = [CollectionRequestSchema]),
        (status = 500, description = "Record document is corrupt", body = ErrorSchema),
        (status = 503, description = "Record document unavailable", body = ErrorSchema)
    )
)]
#[get("/collectes")]
pub async fn list_collection_requests(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CollectionRequest>>> {
    let records = state.collection_requests_query.list().await?;
    Ok(web::Json(records))
}

/// Submit a new collection request.
///
/// Responds once the record is persisted; notifications are sent in the
/// background and never affect the response.
#[utoipa::path(
    post,
    path = "/api/collectes",
    tags = ["collectes"],
    request_body = CreateCollectionRequestBody,
    responses(
        (status = 201, description = "Collection request created", body = CollectionRequestSchema),
        (status = 400, description = "Invalid payload", body = ErrorSchema),
        (status = 500, description = "Record document is corrupt", body = ErrorSchema),
        (status = 503, description = "Record document unavailable", body = ErrorSchema)
    )
)]
#[post("/collectes")]
pub async fn create_collection_request(
    state: web::Data<HttpState>,
    payload: web::Json<CreateCollectionRequestBody>,
) -> ApiResult<HttpResponse> {
    let record = state
        .collection_requests
        .create(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// Replace the status of a collection request.
#[utoipa::path(
    patch,
    path = "/api/collectes/{id}/status",
    tags = ["collectes"],
    params(("id" = u64, Path, description = "Collection request identifier")),
    request_body = UpdateStatusBody,
    responses(
        (status = 200, description = "Updated collection request", body = CollectionRequestSchema),
        (status = 400, description = "Invalid payload", body = ErrorSchema),
        (status = 404, description = "Unknown collection request", body = ErrorSchema),
        (status = 503, description = "Record document unavailable", body = ErrorSchema)
    )
)]
#[patch("/collectes/{id}/status")]
pub async fn update_collection_request_status(
    state: web::Data<HttpState>,
    path: web::Path<u64>,
    payload: web::Json<UpdateStatusBody>,
) -> ApiResult<web::Json<CollectionRequest>> {
    let raw_id = path.into_inner();
    let id = CollectionRequestId::new(raw_id)
        .map_err(|_| Error::not_found(format!("collection request {raw_id} not found")))?;
    let status = CollectionStatus::new(payload.into_inner().statut)
        .map_err(|err| map_validation_error(&err))?;
    let record = state
        .collection_requests
        .update_status(id, status)
        .await?;
    Ok(web::Json(record))
}

#[cfg(test)]
#[path = "collectes_tests.rs"]
mod tests;
