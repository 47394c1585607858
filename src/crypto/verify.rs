//! Ed25519 signature verification.

use crate::errors::LicenceFault;
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Decode a hex-encoded Ed25519 public key (64 hex characters).
pub fn decode_public_key(hex_key: &str) -> Result<VerifyingKey, LicenceFault> {
    let bytes = hex::decode(hex_key.trim())
        .map_err(|e| LicenceFault::InvalidPublicKey(format!("not hex ({})", e)))?;

    let key_array: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
        LicenceFault::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len()))
    })?;

    VerifyingKey::from_bytes(&key_array)
        .map_err(|e| LicenceFault::InvalidPublicKey(e.to_string()))
}

/// Verify a base64 Ed25519 signature over `message`.
pub fn verify_ed25519(
    signature_b64: &str,
    message: &[u8],
    verifying_key: &VerifyingKey,
) -> Result<(), LicenceFault> {
    let sig_bytes = STANDARD
        .decode(signature_b64)
        .map_err(|e| LicenceFault::Malformed(format!("signature is not base64 ({})", e)))?;

    let sig_array: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| LicenceFault::SignatureInvalid)?;

    let signature = Signature::from_bytes(&sig_array);

    verifying_key
        .verify(message, &signature)
        .map_err(|_| LicenceFault::SignatureInvalid)
}
