//! Licence verifier - the one-time check behind enforcement.
//!
//! A [`Verifier`] is called once at startup and then only read:
//! - `verify` performs the (possibly slow) verification and fixes the state
//! - `current_authorization` returns the fixed state on every request

use crate::clock::{Clock, SystemClock};
use crate::crypto::licence::verify_licence;
use crate::protocol::models::AuthorizationState;
use crate::record::LicenceRecord;
use crate::LicencingError;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{info, warn};

/// Capability that turns a licence record into an authorization state.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Verify the licence.
    ///
    /// On success the state becomes authorized and bound to
    /// `record.domain()`.
    ///
    /// # Errors
    /// `LicenceVerification` when the licence is invalid, expired,
    /// mis-signed, or issued for another email or domain.
    async fn verify(&self, record: &LicenceRecord) -> Result<(), LicencingError>;

    /// Last computed state. Never re-verifies; unauthorized until a
    /// `verify` call has succeeded.
    fn current_authorization(&self) -> AuthorizationState;
}

/// Offline verifier for Ed25519-signed licences.
///
/// The first completed `verify` publishes the state; it is never
/// replaced afterwards, so later reads need no locking.
pub struct Ed25519Verifier {
    clock: Arc<dyn Clock>,
    state: OnceCell<AuthorizationState>,
}

impl Default for Ed25519Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Ed25519Verifier {
    /// Create a verifier using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a verifier with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(clock)
    }

    fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: OnceCell::new(),
        }
    }

    fn evaluate(&self, record: &LicenceRecord) -> AuthorizationState {
        match verify_licence(record, self.clock.as_ref()) {
            Ok(payload) => {
                info!(
                    email = %payload.email,
                    domain = %payload.domain,
                    fingerprint = %record.fingerprint(),
                    expires_at = ?payload.expires_at,
                    "licence verified"
                );
                AuthorizationState::authorized(record.domain())
            }
            Err(fault) => {
                warn!(
                    domain = %record.domain(),
                    fingerprint = %record.fingerprint(),
                    reason = %fault,
                    "licence rejected"
                );
                AuthorizationState::unauthorized(fault.to_string())
            }
        }
    }
}

#[async_trait]
impl Verifier for Ed25519Verifier {
    async fn verify(&self, record: &LicenceRecord) -> Result<(), LicencingError> {
        let state = self.state.get_or_init(|| self.evaluate(record));

        if state.authorized {
            Ok(())
        } else {
            Err(LicencingError::LicenceVerification {
                reason: state.reason.clone(),
            })
        }
    }

    fn current_authorization(&self) -> AuthorizationState {
        self.state.get().cloned().unwrap_or_default()
    }
}

/// Verifier with a fixed outcome, for exercising enforcement.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone)]
pub struct MockVerifier {
    state: AuthorizationState,
}

#[cfg(any(test, feature = "test-seams"))]
impl MockVerifier {
    /// Always authorized for `bound_host`.
    pub fn authorized(bound_host: &str) -> Self {
        Self {
            state: AuthorizationState::authorized(bound_host),
        }
    }

    /// Always refused with `reason`.
    pub fn unauthorized(reason: &str) -> Self {
        Self {
            state: AuthorizationState::unauthorized(reason),
        }
    }
}

#[cfg(any(test, feature = "test-seams"))]
#[async_trait]
impl Verifier for MockVerifier {
    async fn verify(&self, _record: &LicenceRecord) -> Result<(), LicencingError> {
        if self.state.authorized {
            Ok(())
        } else {
            Err(LicencingError::LicenceVerification {
                reason: self.state.reason.clone(),
            })
        }
    }

    fn current_authorization(&self) -> AuthorizationState {
        self.state.clone()
    }
}
