//! Licencing error types.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while bootstrapping or enforcing a licence.
///
/// Every variant surfaces to HTTP clients as `503 Service Unavailable`.
/// The first two only occur at startup and abort it; the last two are
/// produced per request and are always recovered into a response.
#[derive(Debug, Error)]
pub enum LicencingError {
    /// Required configuration (environment variables, exemption list) is missing or invalid.
    #[error("{0}")]
    Configuration(String),

    /// The licence was rejected by the verifier during startup.
    #[error("{reason}")]
    LicenceVerification {
        /// Why the verifier refused the licence.
        reason: String,
    },

    /// The cached authorization state is not authorized.
    #[error("{reason}")]
    NotLicensed {
        /// Reason stored by the verifier.
        reason: String,
    },

    /// The request `Host` is missing or differs from the licensed host.
    #[error("{reason}")]
    HostMismatch {
        /// Human readable reason, naming the offending host when one was sent.
        reason: String,
    },
}

impl LicencingError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        StatusCode::SERVICE_UNAVAILABLE
    }

    /// Short machine-friendly label, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            LicencingError::Configuration(_) => "configuration",
            LicencingError::LicenceVerification { .. } => "licence_verification",
            LicencingError::NotLicensed { .. } => "not_licensed",
            LicencingError::HostMismatch { .. } => "host_mismatch",
        }
    }
}

impl IntoResponse for LicencingError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.to_string()).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

/// Reasons a signed licence fails verification.
///
/// These are folded into [`LicencingError::LicenceVerification`] at the
/// verifier boundary; the display text becomes the stored reason.
#[derive(Debug, Error)]
pub enum LicenceFault {
    /// The public key is not a valid hex-encoded Ed25519 key.
    #[error("Licence public key is invalid: {0}")]
    InvalidPublicKey(String),

    /// The licence blob could not be decoded.
    #[error("Licence is malformed: {0}")]
    Malformed(String),

    /// The Ed25519 signature does not match the payload.
    #[error("Licence signature is invalid")]
    SignatureInvalid,

    /// The payload was issued for another email or domain.
    #[error("Licence was not issued for {field} {value}")]
    NotIssuedFor {
        /// Which payload field disagreed (`email` or `domain`).
        field: &'static str,
        /// The value the caller presented.
        value: String,
    },

    /// The payload expiry is in the past.
    #[error("Licence expired on {}", .expired_at.to_rfc3339())]
    Expired {
        /// Expiry recorded in the payload.
        expired_at: DateTime<Utc>,
    },
}

impl From<LicenceFault> for LicencingError {
    fn from(fault: LicenceFault) -> Self {
        LicencingError::LicenceVerification {
            reason: fault.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn every_variant_maps_to_service_unavailable() {
        let errors = [
            LicencingError::Configuration("missing".into()),
            LicencingError::LicenceVerification { reason: "bad".into() },
            LicencingError::NotLicensed { reason: "nope".into() },
            LicencingError::HostMismatch { reason: "elsewhere".into() },
        ];
        for err in errors {
            assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    #[test]
    fn display_is_the_bare_reason() {
        let err = LicencingError::HostMismatch {
            reason: "Unauthorized.".into(),
        };
        assert_eq!(err.to_string(), "Unauthorized.");
        assert_eq!(err.kind(), "host_mismatch");
    }

    #[test]
    fn into_response_is_plain_text_503() {
        let response = LicencingError::NotLicensed {
            reason: "expired".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn fault_becomes_verification_error() {
        let expired_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err: LicencingError = LicenceFault::Expired { expired_at }.into();
        assert!(matches!(
            err,
            LicencingError::LicenceVerification { ref reason }
                if reason == "Licence expired on 2024-01-01T00:00:00+00:00"
        ));
    }

    #[test]
    fn not_issued_for_names_field_and_value() {
        let fault = LicenceFault::NotIssuedFor {
            field: "domain",
            value: "evil.example.com".into(),
        };
        assert_eq!(
            fault.to_string(),
            "Licence was not issued for domain evil.example.com"
        );
    }
}
