//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: the JSON document holding every collection request.
//! - **notification**: webhook relays for the email and WhatsApp channels.
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod notification;
pub mod persistence;
