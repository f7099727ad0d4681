//! Domain primitives, services, and ports.
//!
//! Purpose: define the collection request model and the use cases that
//! create, list, and update it, independent of HTTP and of the storage
//! format. Adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - [`CollectionRequest`] and its value objects.
//! - [`CollectionRequestService`]: create, list, and status-update use cases.
//! - [`NotificationDispatcher`]: background fanout to notification endpoints.
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failures.
//! - [`TraceId`]: request correlation identifier.

pub mod collection_request;
pub mod collection_request_service;
pub mod error;
pub mod notification_dispatcher;
pub mod ports;
pub mod trace_id;

pub use self::collection_request::{
    CollectionRequest, CollectionRequestDraft, CollectionRequestId,
    CollectionRequestValidationError, CollectionStatus,
};
pub use self::collection_request_service::{
    CollectionRequestService, DEFAULT_MINIMUM_CANETTES, map_validation_error,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::notification_dispatcher::{
    DEFAULT_MAX_PENDING_NOTIFICATIONS, DEFAULT_NOTIFICATION_TIMEOUT, NotificationDispatcher,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("collection request 4 not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
