//! Licence payload and authorization state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason reported before any licence has been verified.
pub const UNVERIFIED_REASON: &str = "Licence has not been verified.";

/// Claims carried inside a signed licence blob.
///
/// Encoded as JSON, then base64, then signed; see
/// [`crate::crypto::licence`] for the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicencePayload {
    /// Email the licence was issued to.
    pub email: String,

    /// Host the licence is bound to.
    pub domain: String,

    /// Issue time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,

    /// Expiry time; absent means perpetual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl LicencePayload {
    /// Whether the payload has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }
}

/// Result of the one-time licence verification.
///
/// Written once by a [`crate::Verifier`] and read on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationState {
    /// Whether the licence was accepted.
    pub authorized: bool,

    /// Why the licence was refused; empty when authorized.
    pub reason: String,

    /// Host the active licence is bound to; empty when unauthorized.
    pub bound_host: String,
}

impl AuthorizationState {
    /// State for an accepted licence bound to `bound_host`.
    pub fn authorized(bound_host: impl Into<String>) -> Self {
        Self {
            authorized: true,
            reason: String::new(),
            bound_host: bound_host.into(),
        }
    }

    /// State for a refused licence.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self {
            authorized: false,
            reason: reason.into(),
            bound_host: String::new(),
        }
    }
}

impl Default for AuthorizationState {
    fn default() -> Self {
        Self::unauthorized(UNVERIFIED_REASON)
    }
}
