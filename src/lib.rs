//! # Licencing Middleware
//!
//! **Runtime licence enforcement for [axum](https://docs.rs/axum) servers.**
//!
//! A signed licence is verified once at startup against an Ed25519 public
//! key. After that, every successful response is re-checked: the licence
//! must still be authorized and the request host (`Host` header, or the
//! HTTP/2 `:authority`) must equal the host the licence is bound to. Otherwise the response is replaced with
//! `503 Service Unavailable` and a plain-text reason.
//!
//! ## Features
//!
//! - **One-shot verification** - the licence is checked once, before the listener binds
//! - **Host binding** - exact host match against the licensed domain
//! - **Sealed router** - [`LicencedRouter`] cannot gain routes after enforcement is installed
//! - **Errors stay visible** - responses with status >= 400 are never overridden
//! - **Static exemptions** - first path segments such as `assets` skip enforcement
//! - **Pluggable verifier** - swap [`Ed25519Verifier`] for any [`Verifier`]
//!
//! ## Quickstart
//!
//! ```no_run
//! use licencing_middleware::{Ed25519Verifier, LicenceRecord, LicencingMiddleware};
//! use std::sync::Arc;
//!
//! // Hard-code the verifying key; the rest comes from LICENCE_EMAIL,
//! // LICENCE_DOMAIN and LICENCE_APP.
//! const PUBLIC_KEY: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let licence = LicenceRecord::from_env(PUBLIC_KEY)?;
//!     // Every route must be registered before `setup`.
//!     let router = axum::Router::new().route("/", axum::routing::get(|| async { "hello" }));
//!
//!     let app = LicencingMiddleware::new(None, licence)
//!         .setup_default(router, Arc::new(Ed25519Verifier::new()))
//!         .await?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app.into_make_service()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Licence format
//!
//! `<base64(payload json)>.<base64(signature)>` where the payload carries
//! `email`, `domain` and optional `issued_at` / `expires_at` (RFC 3339).
//! See [`crypto::licence`].
//!
//! ## Threat Model
//!
//! The mismatch reason echoes the client-supplied `Host` back in the
//! response body. Nothing here prevents binary patching; client-side
//! licensing can always be bypassed with access to the binary.

#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;
pub mod notice;
pub mod record;

// Crypto layer
pub mod crypto;

// Protocol layer
pub mod protocol;

// Policy layer
pub mod policy;

// Verification
pub mod verifier;

// HTTP layer
pub mod middleware;

// Startup (main public API)
pub mod bootstrap;

// Re-exports for public API
pub use bootstrap::{LicencedRouter, LicencingMiddleware};
pub use clock::{Clock, SystemClock};
pub use config::{ExemptionConfig, DEFAULT_IGNORED_PATH_ROOTS};
pub use errors::{LicenceFault, LicencingError};
pub use middleware::enforce::{enforce_licence, request_host, LicenceGate};
pub use middleware::error_pages::{render_error_pages, ErrorContext};
pub use notice::CopyrightNotice;
pub use protocol::models::{AuthorizationState, LicencePayload};
pub use record::LicenceRecord;
pub use verifier::{Ed25519Verifier, Verifier};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
#[cfg(any(test, feature = "test-seams"))]
pub use verifier::MockVerifier;
