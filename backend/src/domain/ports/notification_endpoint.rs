//! Port for outbound "new collection request" notifications.
//!
//! Each configured channel is one [`NotificationEndpoint`]. Delivery is
//! advisory: the domain logs failures and never retries them.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::CollectionRequest;

use super::define_port_error;

/// Notification channel served by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    /// Email relay webhook.
    Email,
    /// WhatsApp relay webhook.
    Whatsapp,
}

impl NotificationChannel {
    /// Wire label of the channel.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body sent to a notification endpoint.
///
/// # Examples
/// ```
/// use backend::domain::ports::{NotificationChannel, NotificationPayload};
/// # use backend::domain::{CollectionRequest, CollectionRequestDraft, CollectionRequestId};
/// # let record = CollectionRequest::create(
/// #     CollectionRequestId::following(0),
/// #     CollectionRequestDraft {
/// #         nom: "Alice".into(),
/// #         telephone: "0600000000".into(),
/// #         ville: "Nancy".into(),
/// #         type_client: "particulier".into(),
/// #         creneau: "2024-06-15".into(),
/// #         canettes: 5,
/// #     },
/// #     chrono::Utc::now(),
/// # );
///
/// let payload = NotificationPayload::new(NotificationChannel::Email, record);
/// let body = serde_json::to_value(&payload).expect("payload serialises");
/// assert_eq!(body["channel"], "email");
/// assert_eq!(body["record"]["nom"], "Alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Channel the payload is addressed to.
    pub channel: NotificationChannel,
    /// The newly created record.
    pub record: CollectionRequest,
}

impl NotificationPayload {
    /// Address `record` to `channel`.
    #[must_use]
    pub const fn new(channel: NotificationChannel, record: CollectionRequest) -> Self {
        Self { channel, record }
    }
}

define_port_error! {
    /// Errors raised while delivering a notification.
    pub enum NotificationError {
        /// The endpoint could not be reached.
        Transport { message: String } =>
            "notification transport failed: {message}",
        /// The endpoint answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "notification rejected with status {status}: {message}",
        /// The endpoint did not answer in time.
        Timeout { message: String } =>
            "notification timed out: {message}",
        /// The payload could not be encoded.
        Encode { message: String } =>
            "notification payload could not be encoded: {message}",
    }
}

/// Outbound endpoint for one notification channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationEndpoint: Send + Sync {
    /// Channel this endpoint serves.
    fn channel(&self) -> NotificationChannel;

    /// Deliver `payload` once.
    async fn deliver(&self, payload: &NotificationPayload) -> Result<(), NotificationError>;
}
