//! Static-content exemption by first path segment.

use crate::config::ExemptionConfig;

/// First non-empty segment of a request path.
///
/// `/` and the empty string have none.
pub fn first_segment(path: &str) -> Option<&str> {
    path.split('/').find(|segment| !segment.is_empty())
}

/// Check whether a request path is exempt from licence enforcement.
///
/// Only the first segment is inspected and it must equal one of the
/// configured roots exactly. Deeper segments never exempt a request.
pub fn is_exempt(path: &str, config: &ExemptionConfig) -> bool {
    match first_segment(path) {
        Some(segment) => config
            .ignored_path_roots
            .iter()
            .any(|root| root == segment),
        None => false,
    }
}
