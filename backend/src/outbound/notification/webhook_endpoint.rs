//! Reqwest-backed webhook endpoint for notification channels.
//!
//! The adapter owns transport details only: body encoding, headers, the
//! client timeout, and mapping HTTP failures onto [`NotificationError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{
    NotificationChannel, NotificationEndpoint, NotificationError, NotificationPayload,
};
use crate::domain::{TRACE_ID_HEADER, TraceId};

const DEFAULT_USER_AGENT: &str = concat!("collecte/", env!("CARGO_PKG_VERSION"));

/// Notification endpoint that POSTs the payload as JSON to one URL.
#[derive(Debug, Clone)]
pub struct WebhookEndpoint {
    client: Client,
    channel: NotificationChannel,
    url: Url,
}

impl WebhookEndpoint {
    /// Build an endpoint for `channel` with a client-side request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        channel: NotificationChannel,
        url: Url,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            channel,
            url,
        })
    }
}

#[async_trait]
impl NotificationEndpoint for WebhookEndpoint {
    fn channel(&self) -> NotificationChannel {
        self.channel
    }

    async fn deliver(&self, payload: &NotificationPayload) -> Result<(), NotificationError> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| NotificationError::encode(err.to_string()))?;
        let mut request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, DEFAULT_USER_AGENT);
        if let Some(trace_id) = TraceId::current() {
            request = request.header(TRACE_ID_HEADER, trace_id.to_string());
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> NotificationError {
    if error.is_timeout() {
        NotificationError::timeout(error.to_string())
    } else {
        NotificationError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NotificationError {
    NotificationError::rejected(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
        format!("{preview}...")
    } else {
        compact
    }
}
