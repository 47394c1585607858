//! Enforcement configuration.

use crate::policy::exemption;
use crate::LicencingError;

/// Path roots served without licence enforcement.
pub const DEFAULT_IGNORED_PATH_ROOTS: &[&str] = &["assets"];

/// Which request paths skip enforcement.
///
/// Only the first segment of a path is compared, so `assets` exempts
/// `/assets/logo.png` and `/assets/css/site.css` but not `/static/assets/x`.
/// Set once at bootstrap and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExemptionConfig {
    /// First path segments that are exempt (exact match).
    pub ignored_path_roots: Vec<String>,
}

impl Default for ExemptionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED_PATH_ROOTS.iter().copied())
    }
}

impl ExemptionConfig {
    /// Build from any list of roots.
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored_path_roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Configuration that exempts nothing.
    pub fn none() -> Self {
        Self {
            ignored_path_roots: Vec::new(),
        }
    }

    /// Whether `path` is exempt from enforcement.
    pub fn is_exempt(&self, path: &str) -> bool {
        exemption::is_exempt(path, self)
    }

    /// Reject roots that could never match a single path segment.
    pub fn validate(&self) -> Result<(), LicencingError> {
        for root in &self.ignored_path_roots {
            if root.is_empty() {
                return Err(LicencingError::Configuration(
                    "ignored path roots cannot be empty".to_string(),
                ));
            }
            if root.contains('/') {
                return Err(LicencingError::Configuration(format!(
                    "ignored path root must be a single segment, got {root:?}"
                )));
            }
        }
        Ok(())
    }
}
