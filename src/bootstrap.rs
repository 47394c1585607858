//! Startup sequence - the main public API.
//!
//! `LicencingMiddleware::setup` must run before the server binds its
//! listener:
//! 1. Print the copyright notice (if any)
//! 2. Prepare the error-page layer
//! 3. Verify the licence once
//! 4. Re-confirm authorization and install enforcement
//!
//! Any failure is returned and the caller must not serve the router.
//! On success the router comes back sealed as a [`LicencedRouter`]: routes
//! can no longer be added, so every route is behind enforcement.

use crate::config::ExemptionConfig;
use crate::middleware::enforce::{enforce_licence, LicenceGate};
use crate::middleware::error_pages::render_error_pages;
use crate::notice::CopyrightNotice;
use crate::record::LicenceRecord;
use crate::verifier::Verifier;
use crate::LicencingError;
use axum::{
    extract::Request,
    http,
    middleware,
    response::IntoResponse,
    routing::{IntoMakeService, Route},
    Router,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{info, warn};

/// Licence enforcement for an axum application.
#[derive(Debug, Clone)]
pub struct LicencingMiddleware {
    /// Notice printed at startup.
    pub notice: Option<CopyrightNotice>,

    /// Licence presented to the verifier.
    pub licence: LicenceRecord,
}

impl LicencingMiddleware {
    /// Create the middleware for a licence, optionally with a notice.
    pub fn new(notice: Option<CopyrightNotice>, licence: LicenceRecord) -> Self {
        Self { notice, licence }
    }

    /// Verify the licence and wrap `router` with error pages and enforcement.
    ///
    /// `router` must already carry every route: the result is sealed.
    ///
    /// The error-page layer wraps the enforcement layer, so rejections and
    /// inner failures are both rendered by it.
    ///
    /// # Errors
    /// - `LicenceVerification` - the verifier refused the licence
    /// - `NotLicensed` - the verifier did not report an authorized state
    /// - `Configuration` - the exemption list is invalid
    pub async fn setup<S>(
        &self,
        router: Router<S>,
        verifier: Arc<dyn Verifier>,
        exemptions: ExemptionConfig,
    ) -> Result<LicencedRouter<S>, LicencingError>
    where
        S: Clone + Send + Sync + 'static,
    {
        if let Some(notice) = &self.notice {
            notice.print();
        }

        let error_pages = middleware::from_fn(render_error_pages);

        if let Err(err) = verifier.verify(&self.licence).await {
            warn!(
                domain = %self.licence.domain(),
                reason = %err,
                "licence verification failed, refusing to start"
            );
            return Err(err);
        }

        let gate = Arc::new(LicenceGate::build(verifier, exemptions)?);
        info!(
            domain = %self.licence.domain(),
            ignored_path_roots = ?gate.exemptions().ignored_path_roots,
            "licence enforcement installed"
        );

        Ok(LicencedRouter {
            router: router
                .layer(middleware::from_fn_with_state(gate, enforce_licence))
                .layer(error_pages),
        })
    }

    /// [`setup`](Self::setup) with the default exemption list (`["assets"]`).
    pub async fn setup_default<S>(
        &self,
        router: Router<S>,
        verifier: Arc<dyn Verifier>,
    ) -> Result<LicencedRouter<S>, LicencingError>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.setup(router, verifier, ExemptionConfig::default()).await
    }
}

/// Router with licence enforcement installed.
///
/// Returned by [`LicencingMiddleware::setup`]. There is no way to add routes,
/// so nothing registered after startup can skip the licence check. Outer
/// layers such as tracing can still be added with [`layer`](Self::layer).
///
/// ```compile_fail
/// use licencing_middleware::LicencedRouter;
///
/// fn late_route(app: LicencedRouter) {
///     let _ = app.route("/late", axum::routing::get(|| async { "late" }));
/// }
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct LicencedRouter<S = ()> {
    router: Router<S>,
}

impl<S> LicencedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Wrap the whole gated router in an outer layer.
    pub fn layer<L>(self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        Self {
            router: self.router.layer(layer),
        }
    }

    /// Provide the router state.
    pub fn with_state<S2>(self, state: S) -> LicencedRouter<S2> {
        LicencedRouter {
            router: self.router.with_state(state),
        }
    }
}

impl LicencedRouter {
    /// Make service for `axum::serve`.
    pub fn into_make_service(self) -> IntoMakeService<Router> {
        self.router.into_make_service()
    }
}

impl<B> Service<http::Request<B>> for LicencedRouter
where
    Router: Service<http::Request<B>>,
{
    type Response = <Router as Service<http::Request<B>>>::Response;
    type Error = <Router as Service<http::Request<B>>>::Error;
    type Future = <Router as Service<http::Request<B>>>::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Service::<http::Request<B>>::poll_ready(&mut self.router, cx)
    }

    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        self.router.call(request)
    }
}
