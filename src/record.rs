//! The licence presented at startup.

use crate::crypto::digest::sha256_hex;
use crate::LicencingError;
use std::fmt;

/// Environment variable holding the licensed email.
pub const ENV_LICENCE_EMAIL: &str = "LICENCE_EMAIL";
/// Environment variable holding the licensed host.
pub const ENV_LICENCE_DOMAIN: &str = "LICENCE_DOMAIN";
/// Environment variable holding the signed licence blob.
pub const ENV_LICENCE_APP: &str = "LICENCE_APP";

/// Public key, email, bound host, and licence blob.
///
/// Immutable once built. The public key should be compiled into the
/// application, never read from the environment; the other three fields
/// may come from [`LicenceRecord::from_env`].
#[derive(Clone, PartialEq, Eq)]
pub struct LicenceRecord {
    public_key: String,
    email: String,
    domain: String,
    licence: String,
}

impl LicenceRecord {
    /// Build a record from explicit values.
    pub fn new(
        public_key: impl Into<String>,
        email: impl Into<String>,
        domain: impl Into<String>,
        licence: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            email: email.into(),
            domain: domain.into(),
            licence: licence.into(),
        }
    }

    /// Build a record from `LICENCE_EMAIL`, `LICENCE_DOMAIN` and `LICENCE_APP`.
    ///
    /// # Errors
    /// `Configuration` if any of the three is unset or not unicode.
    pub fn from_env(public_key: impl Into<String>) -> Result<Self, LicencingError> {
        Self::from_lookup(public_key, |name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(public_key: impl Into<String>, lookup: F) -> Result<Self, LicencingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match (
            lookup(ENV_LICENCE_EMAIL),
            lookup(ENV_LICENCE_DOMAIN),
            lookup(ENV_LICENCE_APP),
        ) {
            (Some(email), Some(domain), Some(licence)) => {
                Ok(Self::new(public_key, email, domain, licence))
            }
            _ => Err(LicencingError::Configuration(format!(
                "You must set your env variables {} / {} / {}",
                ENV_LICENCE_EMAIL, ENV_LICENCE_APP, ENV_LICENCE_DOMAIN
            ))),
        }
    }

    /// Hex Ed25519 verifying key.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Licensed email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Host the licence is bound to.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Signed licence blob.
    pub fn licence(&self) -> &str {
        &self.licence
    }

    /// SHA-256 of the licence blob, safe to log.
    pub fn fingerprint(&self) -> String {
        sha256_hex(self.licence.as_bytes())
    }
}

impl fmt::Debug for LicenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenceRecord")
            .field("public_key", &self.public_key)
            .field("email", &self.email)
            .field("domain", &self.domain)
            .field("licence", &"<redacted>")
            .finish()
    }
}
