//! Port through which the request handler announces newly created records.
//!
//! Implementations must return promptly: delivery happens in the background
//! and its outcome never reaches the caller.

use crate::domain::CollectionRequest;

/// Fire-and-forget hook invoked once per successfully persisted creation.
#[cfg_attr(test, mockall::automock)]
pub trait RecordCreatedNotifier: Send + Sync {
    /// Schedule notifications for `record` without waiting for them.
    fn notify(&self, record: &CollectionRequest);
}

/// Notifier that drops every announcement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRecordCreatedNotifier;

impl RecordCreatedNotifier for NoOpRecordCreatedNotifier {
    fn notify(&self, _record: &CollectionRequest) {}
}
