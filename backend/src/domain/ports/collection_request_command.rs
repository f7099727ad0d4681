//! Driving port for collection request mutations.
//!
//! HTTP handlers call [`CollectionRequestCommand`] to submit new requests and
//! to move existing ones through their lifecycle. Implementations own the
//! identifier assignment, persistence, and notification side effects.

use async_trait::async_trait;

use crate::domain::{
    CollectionRequest, CollectionRequestDraft, CollectionRequestId, CollectionStatus, Error,
};

/// Domain use-case port for creating and updating collection requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionRequestCommand: Send + Sync {
    /// Persist a new request built from `draft` and return it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The draft violates the quantity rule (invalid request).
    /// - The collection cannot be read or written (service unavailable).
    async fn create(&self, draft: CollectionRequestDraft) -> Result<CollectionRequest, Error>;

    /// Replace the status of request `id` and return the updated record.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no record carries `id`, or a storage
    /// error when the collection cannot be read or written.
    async fn update_status(
        &self,
        id: CollectionRequestId,
        status: CollectionStatus,
    ) -> Result<CollectionRequest, Error>;
}

/// Fixture command that echoes requests back without storing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCollectionRequestCommand;

#[async_trait]
impl CollectionRequestCommand for FixtureCollectionRequestCommand {
    async fn create(&self, draft: CollectionRequestDraft) -> Result<CollectionRequest, Error> {
        Ok(CollectionRequest::create(
            CollectionRequestId::following(0),
            draft,
            chrono::Utc::now(),
        ))
    }

    async fn update_status(
        &self,
        id: CollectionRequestId,
        _status: CollectionStatus,
    ) -> Result<CollectionRequest, Error> {
        Err(Error::not_found(format!("collection request {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;

    fn draft() -> CollectionRequestDraft {
        CollectionRequestDraft {
            nom: "Alice".to_owned(),
            telephone: "0600000000".to_owned(),
            ville: "Nancy".to_owned(),
            type_client: "particulier".to_owned(),
            creneau: "2024-06-15".to_owned(),
            canettes: 5,
        }
    }

    #[tokio::test]
    async fn fixture_command_creates_first_record() {
        let record = FixtureCollectionRequestCommand
            .create(draft())
            .await
            .expect("fixture create succeeds");

        assert_eq!(record.id.get(), 1);
        assert_eq!(record.statut.as_str(), CollectionStatus::NEW);
    }

    #[tokio::test]
    async fn fixture_command_reports_missing_records() {
        let id = CollectionRequestId::new(9).expect("positive id");
        let status = CollectionStatus::new(CollectionStatus::COLLECTED).expect("valid status");
        let err = FixtureCollectionRequestCommand
            .update_status(id, status)
            .await
            .expect_err("fixture has no records");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
