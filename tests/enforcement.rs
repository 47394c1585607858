//! End-to-end enforcement through an axum router.

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Path,
    http::{header::HOST, Request, StatusCode, Version},
    routing::get,
    Router,
};
use licencing_middleware::{
    AuthorizationState, ExemptionConfig, LicenceRecord, LicencedRouter, LicencingError,
    LicencingMiddleware, Verifier,
};
use std::sync::{Arc, RwLock};
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

const BOUND_HOST: &str = "api.example.com";

/// Verifier whose state can be changed after bootstrap.
struct SwitchableVerifier {
    state: RwLock<AuthorizationState>,
}

impl SwitchableVerifier {
    fn authorized() -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(AuthorizationState::authorized(BOUND_HOST)),
        })
    }

    fn revoke(&self, reason: &str) {
        *self.state.write().unwrap() = AuthorizationState::unauthorized(reason);
    }
}

#[async_trait]
impl Verifier for SwitchableVerifier {
    async fn verify(&self, _record: &LicenceRecord) -> Result<(), LicencingError> {
        let state = self.current_authorization();
        if state.authorized {
            Ok(())
        } else {
            Err(LicencingError::LicenceVerification {
                reason: state.reason,
            })
        }
    }

    fn current_authorization(&self) -> AuthorizationState {
        self.state.read().unwrap().clone()
    }
}

async fn echo_status(Path(code): Path<u16>) -> (StatusCode, &'static str) {
    (StatusCode::from_u16(code).unwrap(), "inner")
}

fn routes() -> Router {
    Router::new()
        .route("/", get(|| async { "home" }))
        .route("/users", get(|| async { "user list" }))
        .route("/assets/{*file}", get(|| async { "static bytes" }))
        .route("/status/{code}", get(echo_status))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "no such page") }),
        )
}

async fn gated(verifier: Arc<SwitchableVerifier>) -> LicencedRouter {
    let record = LicenceRecord::new("unused", "ops@example.com", BOUND_HOST, "unused");
    LicencingMiddleware::new(None, record)
        .setup(routes(), verifier, ExemptionConfig::default())
        .await
        .unwrap()
}

async fn send(app: &LicencedRouter, path: &str, host: Option<&str>) -> (StatusCode, String) {
    let mut builder = Request::builder().uri(path);
    if let Some(host) = host {
        builder = builder.header(HOST, host);
    }
    send_request(app, builder.body(Body::empty()).unwrap()).await
}

async fn send_request(app: &LicencedRouter, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn scenario_a_matching_host_passes() {
    let app = gated(SwitchableVerifier::authorized()).await;

    let (status, body) = send(&app, "/users", Some("api.example.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "user list");
}

#[tokio::test]
async fn scenario_b_mismatched_host_rejected() {
    let app = gated(SwitchableVerifier::authorized()).await;

    let (status, body) = send(&app, "/users", Some("evil.example.com")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("api.example.com"));
    assert!(body.contains("evil.example.com"));
}

#[tokio::test]
async fn scenario_c_exempt_path_without_host() {
    let app = gated(SwitchableVerifier::authorized()).await;

    let (status, body) = send(&app, "/assets/logo.png", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "static bytes");
}

#[tokio::test]
async fn scenario_d_revoked_licence_rejected() {
    let verifier = SwitchableVerifier::authorized();
    let app = gated(verifier.clone()).await;
    verifier.revoke("Licence expired on 2024-01-01T00:00:00+00:00");

    for host in [Some("api.example.com"), Some("evil.example.com"), None] {
        let (status, body) = send(&app, "/users", host).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, "Licence expired on 2024-01-01T00:00:00+00:00");
    }
}

#[tokio::test]
async fn scenario_e_inner_error_not_overridden() {
    let app = gated(SwitchableVerifier::authorized()).await;

    let (status, body) = send(&app, "/missing", Some("evil.example.com")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "no such page");
}

#[tokio::test]
async fn missing_host_rejected() {
    let app = gated(SwitchableVerifier::authorized()).await;

    let (status, body) = send(&app, "/users", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("invalid Server"));
}

#[tokio::test]
async fn root_path_is_enforced() {
    let app = gated(SwitchableVerifier::authorized()).await;

    let (status, _) = send(&app, "/", Some("evil.example.com")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = send(&app, "/", Some("api.example.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "home");
}

#[tokio::test]
async fn error_statuses_untouched_in_any_state() {
    let verifier = SwitchableVerifier::authorized();
    let app = gated(verifier.clone()).await;
    let codes = [400u16, 401, 403, 404, 422, 500, 502, 503];

    for code in codes {
        let (status, body) = send(&app, &format!("/status/{code}"), Some("evil.example.com")).await;
        assert_eq!(status.as_u16(), code);
        assert_eq!(body, "inner");
    }

    verifier.revoke("revoked");
    for code in codes {
        let (status, body) = send(&app, &format!("/status/{code}"), None).await;
        assert_eq!(status.as_u16(), code);
        assert_eq!(body, "inner");
    }
}

#[tokio::test]
async fn success_statuses_are_enforced() {
    let app = gated(SwitchableVerifier::authorized()).await;

    for code in [200u16, 201, 202, 302] {
        let (status, body) = send(&app, &format!("/status/{code}"), Some("api.example.com")).await;
        assert_eq!(status.as_u16(), code);
        assert_eq!(body, "inner");

        let (status, _) = send(&app, &format!("/status/{code}"), Some("evil.example.com")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}

#[tokio::test]
async fn exempt_paths_untouched_when_revoked() {
    let verifier = SwitchableVerifier::authorized();
    let app = gated(verifier.clone()).await;
    verifier.revoke("revoked");

    for host in [Some("evil.example.com"), None] {
        let (status, body) = send(&app, "/assets/css/site.css", host).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "static bytes");
    }
}

#[tokio::test]
async fn bodiless_errors_get_error_page() {
    let app = gated(SwitchableVerifier::authorized()).await;

    // No route: the router's own 404 has no body.
    let (status, body) = send(&app, "/nowhere", Some("api.example.com")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"status":"404","reason":"Not Found"}"#);
}

#[tokio::test]
async fn custom_exemptions_replace_default() {
    let record = LicenceRecord::new("unused", "ops@example.com", BOUND_HOST, "unused");
    let router = Router::new()
        .route("/public/{*file}", get(|| async { "public" }))
        .route("/assets/{*file}", get(|| async { "static bytes" }));
    let app = LicencingMiddleware::new(None, record)
        .setup(
            router,
            SwitchableVerifier::authorized(),
            ExemptionConfig::new(["public"]),
        )
        .await
        .unwrap();

    let (status, _) = send(&app, "/public/readme.txt", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "/assets/logo.png", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

fn http2_request(uri: &str) -> Request<Body> {
    // No Host header: HTTP/2 clients send `:authority`, surfaced as the URI authority.
    Request::builder()
        .version(Version::HTTP_2)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn http2_authority_matches_bound_host() {
    let app = gated(SwitchableVerifier::authorized()).await;

    let (status, body) = send_request(&app, http2_request("http://api.example.com/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "user list");
}

#[tokio::test]
async fn http2_authority_mismatch_rejected() {
    let app = gated(SwitchableVerifier::authorized()).await;

    let (status, body) = send_request(&app, http2_request("http://evil.example.com/users")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.ends_with("you are using: evil.example.com"));
}

#[tokio::test]
async fn host_header_wins_over_authority() {
    let app = gated(SwitchableVerifier::authorized()).await;
    let request = Request::builder()
        .uri("http://api.example.com/users")
        .header(HOST, "evil.example.com")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn every_route_of_the_sealed_router_is_enforced() {
    let record = LicenceRecord::new("unused", "ops@example.com", BOUND_HOST, "unused");
    let router = Router::new()
        .route("/late", get(|| async { "registered last" }))
        .nest("/admin", Router::new().route("/panel", get(|| async { "panel" })))
        .fallback(|| async { "catch-all" });
    let app = LicencingMiddleware::new(None, record)
        .setup_default(router, SwitchableVerifier::authorized())
        .await
        .unwrap()
        .layer(TraceLayer::new_for_http());

    for path in ["/late", "/admin/panel", "/anything/else"] {
        let (status, _) = send(&app, path, Some("evil.example.com")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{path}");

        let (status, _) = send(&app, path, Some(BOUND_HOST)).await;
        assert_eq!(status, StatusCode::OK, "{path}");
    }
}
