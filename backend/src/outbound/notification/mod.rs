//! Notification adapters.

mod webhook_endpoint;

pub use webhook_endpoint::WebhookEndpoint;
