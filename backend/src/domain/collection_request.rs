//! Collection request data model.
//!
//! A collection request is a pickup appointment submitted through the public
//! form: who to contact, where, which slot, and how many bags of cans. The
//! JSON field names are part of the persisted document format and of the HTTP
//! contract, so they stay in the camelCase French spelling used by clients.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Validation errors raised by the collection request value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionRequestValidationError {
    /// Identifiers start at 1.
    #[error("collection request id must be a positive integer")]
    ZeroId,
    /// Status labels must contain visible characters.
    #[error("status must not be blank")]
    BlankStatus,
    /// The requested quantity is below the accepted minimum.
    #[error("canettes must be at least {minimum}, got {actual}")]
    QuantityBelowMinimum {
        /// Smallest accepted quantity.
        minimum: u32,
        /// Quantity supplied by the caller.
        actual: u32,
    },
}

/// Positive identifier of a collection request.
///
/// Identifiers are derived from the collection size at creation time and are
/// never reused because records are never deleted.
///
/// # Examples
/// ```
/// use backend::domain::CollectionRequestId;
///
/// let id = CollectionRequestId::new(3).expect("positive id");
/// assert_eq!(id.get(), 3);
/// assert!(CollectionRequestId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct CollectionRequestId(u64);

impl CollectionRequestId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Errors
    /// Returns [`CollectionRequestValidationError::ZeroId`] for `0`.
    pub const fn new(raw: u64) -> Result<Self, CollectionRequestValidationError> {
        if raw == 0 {
            return Err(CollectionRequestValidationError::ZeroId);
        }
        Ok(Self(raw))
    }

    /// Identifier assigned to the next record of a collection holding
    /// `existing` records.
    #[must_use]
    pub const fn following(existing: usize) -> Self {
        Self((existing as u64).saturating_add(1))
    }

    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CollectionRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CollectionRequestId> for u64 {
    fn from(value: CollectionRequestId) -> Self {
        value.0
    }
}

impl TryFrom<u64> for CollectionRequestId {
    type Error = CollectionRequestValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lifecycle label of a collection request.
///
/// Labels are free-form so operators can introduce new ones; the well-known
/// values are exposed as constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionStatus(String);

impl CollectionStatus {
    /// Label given to every freshly created request.
    pub const NEW: &'static str = "nouvelle";
    /// Label for a request with a confirmed pickup slot.
    pub const SCHEDULED: &'static str = "planifiée";
    /// Label for a request whose cans were picked up.
    pub const COLLECTED: &'static str = "collectée";
    /// Label for a cancelled request.
    pub const CANCELLED: &'static str = "annulée";

    /// Validate and construct a status label.
    ///
    /// # Errors
    /// Returns [`CollectionRequestValidationError::BlankStatus`] when the
    /// label is empty or whitespace only.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::CollectionStatus;
    ///
    /// let status = CollectionStatus::new("planifiée").expect("valid status");
    /// assert_eq!(status.as_str(), CollectionStatus::SCHEDULED);
    /// assert!(CollectionStatus::new("  ").is_err());
    /// ```
    pub fn new(label: impl Into<String>) -> Result<Self, CollectionRequestValidationError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(CollectionRequestValidationError::BlankStatus);
        }
        Ok(Self(label))
    }

    /// Status assigned on creation.
    #[must_use]
    pub fn initial() -> Self {
        Self(Self::NEW.to_owned())
    }

    /// Borrow the label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CollectionStatus> for String {
    fn from(value: CollectionStatus) -> Self {
        value.0
    }
}

impl TryFrom<String> for CollectionStatus {
    type Error = CollectionRequestValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Fields supplied by the requester when submitting a collection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequestDraft {
    /// Requester name.
    pub nom: String,
    /// Contact phone number.
    pub telephone: String,
    /// City of the pickup.
    pub ville: String,
    /// Free-form requester category (e.g. `particulier`).
    pub type_client: String,
    /// Requested pickup slot, as the `YYYY-MM-DD` date chosen in the form.
    pub creneau: String,
    /// Number of bags of cans to collect.
    pub canettes: u32,
}

impl CollectionRequestDraft {
    /// Check the requested quantity against `minimum`; `0` disables the rule.
    ///
    /// # Errors
    /// Returns [`CollectionRequestValidationError::QuantityBelowMinimum`] when
    /// the quantity is too small.
    pub const fn ensure_minimum_quantity(
        &self,
        minimum: u32,
    ) -> Result<(), CollectionRequestValidationError> {
        if self.canettes < minimum {
            return Err(CollectionRequestValidationError::QuantityBelowMinimum {
                minimum,
                actual: self.canettes,
            });
        }
        Ok(())
    }
}

/// A persisted collection request.
///
/// ## Invariants
/// - `id` and `created_at` never change after creation.
/// - Only `statut` changes through the public API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    /// Record identifier.
    pub id: CollectionRequestId,
    /// Requester name.
    pub nom: String,
    /// Contact phone number.
    pub telephone: String,
    /// City of the pickup.
    pub ville: String,
    /// Free-form requester category.
    pub type_client: String,
    /// Requested pickup slot.
    pub creneau: String,
    /// Number of bags of cans to collect.
    pub canettes: u32,
    /// Current lifecycle label.
    pub statut: CollectionStatus,
    /// Creation instant, UTC with millisecond precision.
    #[serde(with = "millis_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl CollectionRequest {
    /// Build a new record from a draft with the initial status.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{CollectionRequest, CollectionRequestDraft, CollectionRequestId};
    /// use chrono::Utc;
    ///
    /// let draft = CollectionRequestDraft {
    ///     nom: "Alice".into(),
    ///     telephone: "0600000000".into(),
    ///     ville: "Nancy".into(),
    ///     type_client: "particulier".into(),
    ///     creneau: "2024-06-15".into(),
    ///     canettes: 5,
    /// };
    /// let record = CollectionRequest::create(CollectionRequestId::following(0), draft, Utc::now());
    /// assert_eq!(record.id.get(), 1);
    /// assert_eq!(record.statut.as_str(), "nouvelle");
    /// ```
    #[must_use]
    pub fn create(
        id: CollectionRequestId,
        draft: CollectionRequestDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        let CollectionRequestDraft {
            nom,
            telephone,
            ville,
            type_client,
            creneau,
            canettes,
        } = draft;
        Self {
            id,
            nom,
            telephone,
            ville,
            type_client,
            creneau,
            canettes,
            statut: CollectionStatus::initial(),
            created_at: created_at.trunc_subsecs(3),
        }
    }
}

/// `createdAt` codec: always three fractional digits and a `Z` suffix on
/// output; any RFC 3339 offset on input.
mod millis_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(super) fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}
