//! Port for the collection request document.
//!
//! The store holds the full ordered sequence of records and only supports
//! whole-collection reads and writes. Callers that mutate the collection are
//! responsible for serialising their load-modify-save cycles; the store
//! itself applies last-writer-wins.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::CollectionRequest;

use super::define_port_error;

define_port_error! {
    /// Errors raised by collection request store adapters.
    pub enum CollectionRequestStoreError {
        /// Reading or writing the backing document failed.
        Io { path: String, message: String } =>
            "collection request store I/O failed at {path}: {message}",
        /// The backing document exists but is not a valid record sequence.
        Corrupt { path: String, message: String } =>
            "collection request document at {path} is corrupt: {message}",
    }
}

/// Durable holder of the ordered collection request sequence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionRequestStore: Send + Sync {
    /// Return every record in stored order (newest first).
    ///
    /// Initialises an empty collection when nothing has been persisted yet;
    /// repeated calls without an intervening save return the same result.
    async fn load_all(&self) -> Result<Vec<CollectionRequest>, CollectionRequestStoreError>;

    /// Replace the persisted collection with `records`.
    async fn save_all(
        &self,
        records: &[CollectionRequest],
    ) -> Result<(), CollectionRequestStoreError>;
}

/// In-memory store used by tests and local wiring without a data directory.
#[derive(Debug, Default)]
pub struct FixtureCollectionRequestStore {
    records: Mutex<Vec<CollectionRequest>>,
}

impl FixtureCollectionRequestStore {
    /// Seed the store with `records` in stored order.
    #[must_use]
    pub const fn with_records(records: Vec<CollectionRequest>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Clone the current contents without going through the port.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CollectionRequest> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CollectionRequestStore for FixtureCollectionRequestStore {
    async fn load_all(&self) -> Result<Vec<CollectionRequest>, CollectionRequestStoreError> {
        Ok(self.snapshot())
    }

    async fn save_all(
        &self,
        records: &[CollectionRequest],
    ) -> Result<(), CollectionRequestStoreError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CollectionRequestDraft, CollectionRequestId};
    use chrono::Utc;

    fn record(id: usize) -> CollectionRequest {
        CollectionRequest::create(
            CollectionRequestId::following(id),
            CollectionRequestDraft {
                nom: format!("Client {id}"),
                telephone: "0600000000".to_owned(),
                ville: "Nancy".to_owned(),
                type_client: "particulier".to_owned(),
                creneau: "2024-06-15".to_owned(),
                canettes: 4,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn fixture_store_starts_empty_and_stays_empty_on_reload() {
        let store = FixtureCollectionRequestStore::default();
        let first = store.load_all().await.expect("first load");
        let second = store.load_all().await.expect("second load");
        assert!(first.is_empty());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fixture_store_replaces_contents_on_save() {
        let store = FixtureCollectionRequestStore::with_records(vec![record(0)]);
        let replacement = vec![record(1), record(0)];
        store.save_all(&replacement).await.expect("save");
        assert_eq!(store.load_all().await.expect("load"), replacement);
    }

    #[test]
    fn error_messages_name_the_document() {
        let err = CollectionRequestStoreError::corrupt("data/collectes.json", "expected `[`");
        assert_eq!(
            err.to_string(),
            "collection request document at data/collectes.json is corrupt: expected `[`"
        );
    }
}
