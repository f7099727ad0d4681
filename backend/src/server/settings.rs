//! Service configuration loaded via OrthoConfig.
//!
//! Values are layered from CLI flags, `COLLECTE_*` environment variables,
//! and configuration files. Unset values fall back to the defaults below.

use std::path::PathBuf;
use std::time::Duration;

use backend::domain::ports::NotificationChannel;
use backend::domain::{
    DEFAULT_MAX_PENDING_NOTIFICATIONS, DEFAULT_MINIMUM_CANETTES, DEFAULT_NOTIFICATION_TIMEOUT,
};
use backend::outbound::persistence::DEFAULT_DATA_PATH;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

use super::ServerConfig;

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_millis(10_000);

/// Errors raised while turning settings into a server configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A webhook URL could not be parsed.
    #[error("invalid {channel} webhook URL `{value}`: {source}")]
    InvalidWebhookUrl {
        /// Channel the URL was configured for.
        channel: NotificationChannel,
        /// Raw configured value.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The notification in-flight cap exceeds what the runtime supports.
    #[error("max_pending_notifications must be at most {max}, got {value}")]
    MaxPendingTooLarge {
        /// Configured cap.
        value: usize,
        /// Largest supported cap.
        max: usize,
    },
    /// A webhook URL uses a scheme other than `http` or `https`.
    #[error("{channel} webhook URL `{value}` must use http or https")]
    UnsupportedScheme {
        /// Channel the URL was configured for.
        channel: NotificationChannel,
        /// Raw configured value.
        value: String,
    },
}

/// Configuration values for the collection request service.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COLLECTE")]
pub struct CollecteSettings {
    /// Interface the HTTP listener binds to.
    pub bind_host: Option<String>,
    /// Port the HTTP listener binds to.
    pub port: Option<u16>,
    /// Location of the JSON record document.
    pub data_path: Option<PathBuf>,
    /// Webhook receiving email notifications.
    pub email_webhook_url: Option<String>,
    /// Webhook receiving WhatsApp notifications.
    pub whatsapp_webhook_url: Option<String>,
    /// Per-attempt notification timeout in milliseconds.
    pub notification_timeout_ms: Option<u64>,
    /// Upper bound on notification deliveries in flight.
    pub max_pending_notifications: Option<usize>,
    /// Smallest accepted quantity; `0` disables the check.
    pub minimum_canettes: Option<u32>,
    /// Time allowed for notifications to drain on shutdown, in milliseconds.
    pub shutdown_grace_ms: Option<u64>,
}

impl CollecteSettings {
    /// Return the configured bind host, falling back to all interfaces.
    #[must_use]
    pub fn bind_host(&self) -> &str {
        self.bind_host.as_deref().unwrap_or(DEFAULT_BIND_HOST)
    }

    /// Return the configured port, falling back to 8080.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Return the record document path.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.data_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
    }

    /// Return the per-attempt notification timeout.
    #[must_use]
    pub fn notification_timeout(&self) -> Duration {
        self.notification_timeout_ms
            .map_or(DEFAULT_NOTIFICATION_TIMEOUT, Duration::from_millis)
    }

    /// Return the notification in-flight cap.
    #[must_use]
    pub fn max_pending_notifications(&self) -> usize {
        self.max_pending_notifications
            .unwrap_or(DEFAULT_MAX_PENDING_NOTIFICATIONS)
    }

    /// Return the minimum accepted quantity.
    #[must_use]
    pub fn minimum_canettes(&self) -> u32 {
        self.minimum_canettes.unwrap_or(DEFAULT_MINIMUM_CANETTES)
    }

    /// Return the shutdown drain period.
    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        self.shutdown_grace_ms
            .map_or(DEFAULT_SHUTDOWN_GRACE, Duration::from_millis)
    }

    /// Parse the configured webhook URLs; blank values count as unset.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when a non-blank value is not an absolute
    /// `http` or `https` URL.
    pub fn webhooks(&self) -> Result<Vec<(NotificationChannel, Url)>, SettingsError> {
        [
            (NotificationChannel::Email, &self.email_webhook_url),
            (NotificationChannel::Whatsapp, &self.whatsapp_webhook_url),
        ]
        .into_iter()
        .filter_map(|(channel, value)| {
            let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
            Some(parse_webhook(channel, value))
        })
        .collect()
    }

    /// Resolve every setting into a [`ServerConfig`].
    ///
    /// # Errors
    /// Returns [`SettingsError`] when a webhook URL is invalid or the
    /// notification cap is out of range.
    pub fn to_server_config(&self) -> Result<ServerConfig, SettingsError> {
        let max_pending = self.max_pending_notifications();
        if max_pending > Semaphore::MAX_PERMITS {
            return Err(SettingsError::MaxPendingTooLarge {
                value: max_pending,
                max: Semaphore::MAX_PERMITS,
            });
        }
        Ok(
            ServerConfig::new((self.bind_host().to_owned(), self.port()), self.data_path())
                .with_webhooks(self.webhooks()?)
                .with_notification_timeout(self.notification_timeout())
                .with_max_pending_notifications(max_pending)
                .with_minimum_canettes(self.minimum_canettes())
                .with_shutdown_grace(self.shutdown_grace()),
        )
    }
}

fn parse_webhook(
    channel: NotificationChannel,
    value: &str,
) -> Result<(NotificationChannel, Url), SettingsError> {
    let url = Url::parse(value).map_err(|source| SettingsError::InvalidWebhookUrl {
        channel,
        value: value.to_owned(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SettingsError::UnsupportedScheme {
            channel,
            value: value.to_owned(),
        });
    }
    Ok((channel, url))
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "COLLECTE_BIND_HOST",
        "COLLECTE_PORT",
        "COLLECTE_DATA_PATH",
        "COLLECTE_EMAIL_WEBHOOK_URL",
        "COLLECTE_WHATSAPP_WEBHOOK_URL",
        "COLLECTE_NOTIFICATION_TIMEOUT_MS",
        "COLLECTE_MAX_PENDING_NOTIFICATIONS",
        "COLLECTE_MINIMUM_CANETTES",
        "COLLECTE_SHUTDOWN_GRACE_MS",
    ];

    fn load_from_empty_args() -> CollecteSettings {
        CollecteSettings::load_from_iter([OsString::from("collecte")])
            .expect("config should load")
    }

    /// Every setting variable, unset unless named in `overrides`.
    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_host(), DEFAULT_BIND_HOST);
        assert_eq!(settings.port(), DEFAULT_PORT);
        assert_eq!(settings.data_path(), PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(settings.notification_timeout(), DEFAULT_NOTIFICATION_TIMEOUT);
        assert_eq!(
            settings.max_pending_notifications(),
            DEFAULT_MAX_PENDING_NOTIFICATIONS
        );
        assert_eq!(settings.minimum_canettes(), DEFAULT_MINIMUM_CANETTES);
        assert_eq!(settings.shutdown_grace(), DEFAULT_SHUTDOWN_GRACE);
        assert!(settings.webhooks().expect("no webhooks").is_empty());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let env = env_with(&[
            ("COLLECTE_BIND_HOST", "127.0.0.1"),
            ("COLLECTE_PORT", "3000"),
            ("COLLECTE_DATA_PATH", "/srv/collecte/collectes.json"),
            ("COLLECTE_EMAIL_WEBHOOK_URL", "https://hooks.example.com/email"),
            ("COLLECTE_MINIMUM_CANETTES", "0"),
            ("COLLECTE_NOTIFICATION_TIMEOUT_MS", "250"),
        ]);
        let _guard = lock_env(env);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_host(), "127.0.0.1");
        assert_eq!(settings.port(), 3000);
        assert_eq!(
            settings.data_path(),
            PathBuf::from("/srv/collecte/collectes.json")
        );
        assert_eq!(settings.minimum_canettes(), 0);
        assert_eq!(settings.notification_timeout(), Duration::from_millis(250));
        let webhooks = settings.webhooks().expect("valid webhooks");
        assert_eq!(webhooks.len(), 1);
        assert_eq!(webhooks[0].0, NotificationChannel::Email);
        assert_eq!(webhooks[0].1.as_str(), "https://hooks.example.com/email");
    }

    #[rstest]
    #[case::blank(Some("   "))]
    #[case::empty(Some(""))]
    #[case::unset(None)]
    fn blank_webhook_urls_are_ignored(#[case] value: Option<&str>) {
        let settings = CollecteSettings {
            whatsapp_webhook_url: value.map(str::to_owned),
            ..CollecteSettings::default()
        };
        assert!(settings.webhooks().expect("no webhooks").is_empty());
    }

    #[rstest]
    #[case::not_a_url("not a url")]
    #[case::relative("/hooks/email")]
    fn malformed_webhook_url_is_rejected(#[case] value: &str) {
        let settings = CollecteSettings {
            email_webhook_url: Some(value.to_owned()),
            ..CollecteSettings::default()
        };
        let err = settings.webhooks().expect_err("invalid url");
        assert!(matches!(
            err,
            SettingsError::InvalidWebhookUrl {
                channel: NotificationChannel::Email,
                ..
            }
        ));
    }

    #[rstest]
    fn non_http_webhook_scheme_is_rejected() {
        let settings = CollecteSettings {
            whatsapp_webhook_url: Some("ftp://hooks.example.com/wa".to_owned()),
            ..CollecteSettings::default()
        };
        let err = settings.to_server_config().expect_err("unsupported scheme");
        assert!(matches!(err, SettingsError::UnsupportedScheme { .. }));
    }

    #[rstest]
    fn oversized_notification_cap_is_a_settings_error() {
        let oversized = usize::MAX.to_string();
        let _guard = lock_env(env_with(&[(
            "COLLECTE_MAX_PENDING_NOTIFICATIONS",
            oversized.as_str(),
        )]));

        let settings = load_from_empty_args();
        let err = settings.to_server_config().expect_err("cap too large");

        assert!(matches!(
            err,
            SettingsError::MaxPendingTooLarge { value: usize::MAX, max } if max == Semaphore::MAX_PERMITS
        ));
    }

    #[rstest]
    fn largest_supported_notification_cap_is_accepted() {
        let settings = CollecteSettings {
            max_pending_notifications: Some(Semaphore::MAX_PERMITS),
            ..CollecteSettings::default()
        };

        let config = settings.to_server_config().expect("cap in range");

        assert_eq!(config.max_pending_notifications, Semaphore::MAX_PERMITS);
    }

    #[rstest]
    fn both_channels_are_configured_in_order() {
        let settings = CollecteSettings {
            email_webhook_url: Some("http://localhost:9000/email".to_owned()),
            whatsapp_webhook_url: Some(" http://localhost:9000/wa ".to_owned()),
            ..CollecteSettings::default()
        };
        let channels: Vec<_> = settings
            .webhooks()
            .expect("valid webhooks")
            .into_iter()
            .map(|(channel, _)| channel)
            .collect();
        assert_eq!(
            channels,
            vec![NotificationChannel::Email, NotificationChannel::Whatsapp]
        );
    }
}
