//! Collection request domain service.
//!
//! Implements the create, list, and status-update use cases on top of a
//! [`CollectionRequestStore`]. Mutations run their whole load-modify-save
//! cycle under one async lock so concurrent submissions in this process
//! never observe the same collection size or overwrite each other.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::ports::{
    CollectionRequestCommand, CollectionRequestQuery, CollectionRequestStore,
    CollectionRequestStoreError, RecordCreatedNotifier,
};
use crate::domain::{
    CollectionRequest, CollectionRequestDraft, CollectionRequestId,
    CollectionRequestValidationError, CollectionStatus, Error,
};

/// Smallest number of bags accepted when no override is configured.
pub const DEFAULT_MINIMUM_CANETTES: u32 = 3;

fn map_store_error(error: CollectionRequestStoreError) -> Error {
    match error {
        CollectionRequestStoreError::Io { path, message } => Error::service_unavailable(format!(
            "collection request store unavailable at {path}: {message}"
        )),
        CollectionRequestStoreError::Corrupt { path, message } => Error::internal(format!(
            "collection request document at {path} is corrupt: {message}"
        )),
    }
}

/// Map a value-object validation failure to an invalid-request error whose
/// details name the offending field.
#[must_use]
pub fn map_validation_error(error: &CollectionRequestValidationError) -> Error {
    match *error {
        CollectionRequestValidationError::QuantityBelowMinimum { minimum, .. } => {
            Error::invalid_request(error.to_string()).with_details(json!({
                "field": "canettes",
                "code": "below_minimum",
                "minimum": minimum,
            }))
        }
        CollectionRequestValidationError::BlankStatus => Error::invalid_request(error.to_string())
            .with_details(json!({ "field": "statut", "code": "blank" })),
        CollectionRequestValidationError::ZeroId => Error::invalid_request(error.to_string())
            .with_details(json!({ "field": "id", "code": "not_positive" })),
    }
}

/// Service implementing the collection request driving ports.
#[derive(Clone)]
pub struct CollectionRequestService<S> {
    store: Arc<S>,
    notifier: Arc<dyn RecordCreatedNotifier>,
    clock: Arc<dyn Clock>,
    minimum_canettes: u32,
    write_gate: Arc<Mutex<()>>,
}

impl<S> CollectionRequestService<S> {
    /// Create a service over `store` that announces creations to `notifier`.
    pub fn new(
        store: Arc<S>,
        notifier: Arc<dyn RecordCreatedNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            minimum_canettes: DEFAULT_MINIMUM_CANETTES,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Override the minimum accepted quantity; `0` disables the rule.
    #[must_use]
    pub const fn with_minimum_canettes(mut self, minimum: u32) -> Self {
        self.minimum_canettes = minimum;
        self
    }

    /// Minimum accepted quantity currently enforced.
    #[must_use]
    pub const fn minimum_canettes(&self) -> u32 {
        self.minimum_canettes
    }
}

#[async_trait]
impl<S> CollectionRequestCommand for CollectionRequestService<S>
where
    S: CollectionRequestStore,
{
    async fn create(&self, draft: CollectionRequestDraft) -> Result<CollectionRequest, Error> {
        draft
            .ensure_minimum_quantity(self.minimum_canettes)
            .map_err(|err| map_validation_error(&err))?;

        let record = {
            let _guard = self.write_gate.lock().await;
            let mut records = self.store.load_all().await.map_err(map_store_error)?;
            let record = CollectionRequest::create(
                CollectionRequestId::following(records.len()),
                draft,
                self.clock.utc(),
            );
            records.insert(0, record.clone());
            self.store
                .save_all(&records)
                .await
                .map_err(map_store_error)?;
            record
        };

        info!(
            id = %record.id,
            ville = %record.ville,
            canettes = record.canettes,
            "collection request created"
        );
        self.notifier.notify(&record);
        Ok(record)
    }

    async fn update_status(
        &self,
        id: CollectionRequestId,
        status: CollectionStatus,
    ) -> Result<CollectionRequest, Error> {
        let _guard = self.write_gate.lock().await;
        let mut records = self.store.load_all().await.map_err(map_store_error)?;
        let Some(record) = records.iter_mut().find(|record| record.id == id) else {
            warn!(%id, "status update for unknown collection request");
            return Err(Error::not_found(format!("collection request {id} not found"))
                .with_details(json!({ "id": id.get() })));
        };
        record.statut = status;
        let updated = record.clone();
        self.store
            .save_all(&records)
            .await
            .map_err(map_store_error)?;

        info!(%id, statut = %updated.statut, "collection request status updated");
        Ok(updated)
    }
}

#[async_trait]
impl<S> CollectionRequestQuery for CollectionRequestService<S>
where
    S: CollectionRequestStore,
{
    async fn list(&self) -> Result<Vec<CollectionRequest>, Error> {
        self.store.load_all().await.map_err(map_store_error)
    }
}

#[cfg(test)]
#[path = "collection_request_service_tests.rs"]
mod tests;
