//! SHA-256 fingerprints.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `bytes`.
///
/// Used to identify a licence in logs without printing the blob itself.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
