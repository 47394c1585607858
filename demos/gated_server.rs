//! Licence-gated axum server.
//!
//! Verifies the licence from the environment, then serves a small router
//! behind the enforcement middleware.
//!
//! # Running
//!
//! ```bash
//! export LICENCE_EMAIL="ops@example.com"
//! export LICENCE_DOMAIN="localhost:3000"
//! export LICENCE_APP="<payload>.<signature>"
//! cargo run --example gated_server
//! ```
//!
//! A `.env` file in the working directory is loaded first if present.
//!
//! # Note
//!
//! The verifying key is a compile-time constant. Reading it from the
//! environment would let anyone point the server at their own key.

use axum::{routing::get, Router};
use licencing_middleware::{CopyrightNotice, Ed25519Verifier, LicenceRecord, LicencingMiddleware};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

// Replace with your own Ed25519 verifying key.
const LICENCE_PUBLIC_KEY: &str =
    "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    dotenvy::dotenv().ok();

    let notice = CopyrightNotice::new(
        "2023",
        "Example Inc.",
        "Example Inc.",
        "Gated Server",
        "Demo",
        env!("CARGO_PKG_VERSION"),
    );
    let licence = LicenceRecord::from_env(LICENCE_PUBLIC_KEY)?;

    // All routes go in before `setup`; the licenced router is sealed.
    let router = Router::new()
        .route("/", get(|| async { "licensed hello" }))
        .route("/assets/{*file}", get(|| async { "static asset" }));

    // Startup fails here, before anything is bound, if the licence is bad.
    let app = LicencingMiddleware::new(Some(notice), licence)
        .setup_default(router, Arc::new(Ed25519Verifier::new()))
        .await?
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
