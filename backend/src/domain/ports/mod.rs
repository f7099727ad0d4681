//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`CollectionRequestCommand`], [`CollectionRequestQuery`])
//! are consumed by inbound adapters. Driven ports ([`CollectionRequestStore`],
//! [`NotificationEndpoint`], [`RecordCreatedNotifier`]) are implemented by
//! outbound adapters or by domain services wired at start-up.

mod macros;
pub(crate) use macros::define_port_error;

mod collection_request_command;
mod collection_request_query;
mod collection_request_store;
mod notification_endpoint;
mod record_created_notifier;

#[cfg(test)]
pub use collection_request_command::MockCollectionRequestCommand;
pub use collection_request_command::{
    CollectionRequestCommand, FixtureCollectionRequestCommand,
};
#[cfg(test)]
pub use collection_request_query::MockCollectionRequestQuery;
pub use collection_request_query::{CollectionRequestQuery, FixtureCollectionRequestQuery};
#[cfg(test)]
pub use collection_request_store::MockCollectionRequestStore;
pub use collection_request_store::{
    CollectionRequestStore, CollectionRequestStoreError, FixtureCollectionRequestStore,
};
#[cfg(test)]
pub use notification_endpoint::MockNotificationEndpoint;
pub use notification_endpoint::{
    NotificationChannel, NotificationEndpoint, NotificationError, NotificationPayload,
};
#[cfg(test)]
pub use record_created_notifier::MockRecordCreatedNotifier;
pub use record_created_notifier::{NoOpRecordCreatedNotifier, RecordCreatedNotifier};
