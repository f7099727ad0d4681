//! Driving port for reading collection requests.

use async_trait::async_trait;

use crate::domain::{CollectionRequest, Error};

/// Domain use-case port for listing collection requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionRequestQuery: Send + Sync {
    /// Return every stored request in stored order (newest first).
    async fn list(&self) -> Result<Vec<CollectionRequest>, Error>;
}

/// Fixture query that always reports an empty collection.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCollectionRequestQuery;

#[async_trait]
impl CollectionRequestQuery for FixtureCollectionRequestQuery {
    async fn list(&self) -> Result<Vec<CollectionRequest>, Error> {
        Ok(Vec::new())
    }
}
