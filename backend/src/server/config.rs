//! HTTP server configuration object and helpers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use backend::domain::ports::NotificationChannel;
use backend::domain::{
    DEFAULT_MAX_PENDING_NOTIFICATIONS, DEFAULT_MINIMUM_CANETTES, DEFAULT_NOTIFICATION_TIMEOUT,
};
use url::Url;

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: (String, u16),
    pub(crate) data_path: PathBuf,
    pub(crate) webhooks: Vec<(NotificationChannel, Url)>,
    pub(crate) notification_timeout: Duration,
    pub(crate) max_pending_notifications: usize,
    pub(crate) minimum_canettes: u32,
    pub(crate) shutdown_grace: Duration,
}

impl ServerConfig {
    /// Configuration binding `bind_addr` and storing records at `data_path`.
    #[must_use]
    pub fn new(bind_addr: (String, u16), data_path: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr,
            data_path: data_path.into(),
            webhooks: Vec::new(),
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
            max_pending_notifications: DEFAULT_MAX_PENDING_NOTIFICATIONS,
            minimum_canettes: DEFAULT_MINIMUM_CANETTES,
            shutdown_grace: Duration::from_secs(10),
        }
    }

    /// Notify each `(channel, url)` pair when a record is created.
    #[must_use]
    pub fn with_webhooks(mut self, webhooks: Vec<(NotificationChannel, Url)>) -> Self {
        self.webhooks = webhooks;
        self
    }

    /// Bound every notification attempt by `timeout`.
    #[must_use]
    pub const fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    /// Cap the number of notification deliveries in flight.
    #[must_use]
    pub const fn with_max_pending_notifications(mut self, max_pending: usize) -> Self {
        self.max_pending_notifications = max_pending;
        self
    }

    /// Reject submissions below `minimum` bags; `0` disables the check.
    #[must_use]
    pub const fn with_minimum_canettes(mut self, minimum: u32) -> Self {
        self.minimum_canettes = minimum;
        self
    }

    /// Allow `grace` for notifications to drain after the listener stops.
    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Return the record document path.
    #[must_use]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}
