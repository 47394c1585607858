//! Licence enforcement middleware.
//!
//! Runs the inner handler first, then inspects the finished response:
//! 1. Status >= 400 or exempt path: hand the response back untouched
//! 2. Otherwise re-check the cached authorization and the request host
//! 3. On failure discard the response and answer 503 with the reason

use crate::config::ExemptionConfig;
use crate::policy::enforcement::{enforce, gate, Gate};
use crate::verifier::Verifier;
use crate::LicencingError;
use axum::{
    extract::{Request, State},
    http::{header::HOST, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

/// Shared, read-only state behind the enforcement middleware.
///
/// Built once at bootstrap after the licence has been verified; every
/// request reads it concurrently without locking.
pub struct LicenceGate {
    verifier: Arc<dyn Verifier>,
    exemptions: ExemptionConfig,
}

impl LicenceGate {
    /// Build the gate, re-confirming that the licence is authorized.
    ///
    /// # Errors
    /// - `Configuration` if the exemption list is invalid
    /// - `NotLicensed` if the verifier does not report an authorized state
    pub fn build(
        verifier: Arc<dyn Verifier>,
        exemptions: ExemptionConfig,
    ) -> Result<Self, LicencingError> {
        exemptions.validate()?;

        let state = verifier.current_authorization();
        if !state.authorized {
            return Err(LicencingError::NotLicensed {
                reason: state.reason,
            });
        }

        Ok(Self {
            verifier,
            exemptions,
        })
    }

    /// Exemption configuration in force.
    pub fn exemptions(&self) -> &ExemptionConfig {
        &self.exemptions
    }

    /// Decide the fate of a completed response.
    ///
    /// `Ok` means the original response stands.
    pub fn inspect(
        &self,
        status: StatusCode,
        path: &str,
        host: Option<&str>,
    ) -> Result<(), LicencingError> {
        match gate(status, self.exemptions.is_exempt(path)) {
            Gate::ErrorResponse | Gate::Exempt => Ok(()),
            Gate::Enforce => enforce(&self.verifier.current_authorization(), host),
        }
    }
}

impl fmt::Debug for LicenceGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenceGate")
            .field("exemptions", &self.exemptions)
            .finish_non_exhaustive()
    }
}

/// Host the client addressed.
///
/// The `Host` header wins; HTTP/2 requests carry the host in `:authority`,
/// which arrives as the URI authority instead. A `Host` header that is not
/// visible ASCII counts as missing and does not fall back.
pub fn request_host<B>(request: &axum::http::Request<B>) -> Option<String> {
    match request.headers().get(HOST) {
        Some(value) => value.to_str().ok().map(str::to_owned),
        None => request.uri().authority().map(|authority| authority.as_str().to_owned()),
    }
}

/// Enforcement middleware function.
///
/// Install with `axum::middleware::from_fn_with_state(Arc<LicenceGate>, enforce_licence)`.
/// The host is resolved with [`request_host`].
pub async fn enforce_licence(
    State(gate): State<Arc<LicenceGate>>,
    request: Request,
    next: Next,
) -> Response {
    // Captured up front; the request is consumed by the inner handler.
    let path = request.uri().path().to_owned();
    let host = request_host(&request);

    let response = next.run(request).await;

    match gate.inspect(response.status(), &path, host.as_deref()) {
        Ok(()) => {
            trace!(%path, status = %response.status(), "licence gate passed");
            response
        }
        Err(err) => {
            warn!(
                kind = err.kind(),
                %path,
                host = host.as_deref().unwrap_or("<none>"),
                reason = %err,
                "request rejected by licence gate"
            );
            err.into_response()
        }
    }
}
