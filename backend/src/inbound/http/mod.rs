//! HTTP inbound adapter exposing REST endpoints.

pub mod collectes;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;

use actix_web::{Scope, web};

pub use error::ApiResult;
use error::{JSON_BODY_LIMIT, json_error_handler, path_error_handler};

/// Scope mounting the collection request API under `/api`.
///
/// Carries its own JSON and path extractor configuration so every failure is
/// reported with the domain error envelope.
#[must_use]
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(
            web::JsonConfig::default()
                .limit(JSON_BODY_LIMIT)
                .error_handler(json_error_handler),
        )
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(collectes::list_collection_requests)
        .service(collectes::create_collection_request)
        .service(collectes::update_collection_request_status)
}
