//! Axum middleware installed by the bootstrap.
//!
//! Order, outermost first:
//! - `error_pages` renders bodiless error responses
//! - `enforce` gates successful responses on the licence

pub mod enforce;
pub mod error_pages;
