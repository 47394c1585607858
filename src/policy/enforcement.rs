//! Per-request licence enforcement.
//!
//! Enforcement runs after the inner handler and only on responses that
//! did not already fail:
//! - Status >= 400 passes through untouched
//! - Exempt paths pass through untouched
//! - Otherwise the cached authorization and the request host are checked

use crate::protocol::models::AuthorizationState;
use crate::LicencingError;
use axum::http::StatusCode;

/// Lowest status code treated as an error response.
pub const ERROR_STATUS_FLOOR: u16 = 400;

/// Reason given when a request carries no usable `Host` header.
pub const MISSING_HOST_REASON: &str =
    "Unauthorized. Your request is originating from an invalid Server.";

/// Outcome of the gating step, before any licence check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Inner response is already an error; never overridden.
    ErrorResponse,
    /// Path is on the exemption list.
    Exempt,
    /// Licence checks must run.
    Enforce,
}

/// Decide whether a completed response needs enforcement.
pub fn gate(status: StatusCode, exempt: bool) -> Gate {
    if status.as_u16() >= ERROR_STATUS_FLOOR {
        Gate::ErrorResponse
    } else if exempt {
        Gate::Exempt
    } else {
        Gate::Enforce
    }
}

/// Fail with the stored reason unless the licence is authorized.
pub fn check_authorization(state: &AuthorizationState) -> Result<(), LicencingError> {
    if !state.authorized {
        return Err(LicencingError::NotLicensed {
            reason: state.reason.clone(),
        });
    }
    Ok(())
}

/// Compare the request host against the licensed host (exact match).
pub fn check_host(state: &AuthorizationState, host: Option<&str>) -> Result<(), LicencingError> {
    let Some(host) = host else {
        return Err(LicencingError::HostMismatch {
            reason: MISSING_HOST_REASON.to_string(),
        });
    };

    if host != state.bound_host {
        return Err(LicencingError::HostMismatch {
            reason: format!(
                "Unauthorized. This Software has been licensed to run on http://{}, you are using: {}",
                state.bound_host, host
            ),
        });
    }

    Ok(())
}

/// Run both checks in order, stopping at the first failure.
pub fn enforce(state: &AuthorizationState, host: Option<&str>) -> Result<(), LicencingError> {
    check_authorization(state)?;
    check_host(state, host)
}
