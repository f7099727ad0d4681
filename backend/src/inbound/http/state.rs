//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CollectionRequestCommand, CollectionRequestQuery, FixtureCollectionRequestCommand,
    FixtureCollectionRequestQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Create and status-update use cases.
    pub collection_requests: Arc<dyn CollectionRequestCommand>,
    /// Listing use case.
    pub collection_requests_query: Arc<dyn CollectionRequestQuery>,
}

impl HttpState {
    /// Bundle the collection request ports.
    #[must_use]
    pub fn new(
        collection_requests: Arc<dyn CollectionRequestCommand>,
        collection_requests_query: Arc<dyn CollectionRequestQuery>,
    ) -> Self {
        Self {
            collection_requests,
            collection_requests_query,
        }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureCollectionRequestCommand),
            Arc::new(FixtureCollectionRequestQuery),
        )
    }
}
