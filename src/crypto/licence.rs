//! Signed licence envelope.
//!
//! A licence blob is two standard-base64 segments joined by a dot:
//! ```text
//! <base64(payload json)>.<base64(ed25519 signature)>
//! ```
//! The signature covers the bytes of the first segment as written, so the
//! payload is never re-serialized before checking.

use crate::clock::Clock;
use crate::crypto::verify::{decode_public_key, verify_ed25519};
use crate::errors::LicenceFault;
use crate::protocol::models::LicencePayload;
use crate::record::LicenceRecord;
use base64::{engine::general_purpose::STANDARD, Engine};

/// Separator between payload and signature segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Borrowed view of the two envelope segments.
#[derive(Debug, Clone, Copy)]
pub struct SignedLicence<'a> {
    /// Base64 payload segment (the signed bytes).
    pub payload_b64: &'a str,
    /// Base64 signature segment.
    pub signature_b64: &'a str,
}

/// Split a licence blob into its segments.
pub fn split_licence(blob: &str) -> Result<SignedLicence<'_>, LicenceFault> {
    let blob = blob.trim();
    let mut segments = blob.split(SEGMENT_SEPARATOR);

    match (segments.next(), segments.next(), segments.next()) {
        (Some(payload_b64), Some(signature_b64), None)
            if !payload_b64.is_empty() && !signature_b64.is_empty() =>
        {
            Ok(SignedLicence {
                payload_b64,
                signature_b64,
            })
        }
        _ => Err(LicenceFault::Malformed(
            "expected <payload>.<signature>".to_string(),
        )),
    }
}

/// Decode the payload segment into claims.
pub fn decode_payload(payload_b64: &str) -> Result<LicencePayload, LicenceFault> {
    let json = STANDARD
        .decode(payload_b64)
        .map_err(|e| LicenceFault::Malformed(format!("payload is not base64 ({})", e)))?;

    serde_json::from_slice(&json)
        .map_err(|e| LicenceFault::Malformed(format!("payload is not valid JSON ({})", e)))
}

/// Verify a licence record end to end.
///
/// Checks, in order:
/// 1. Public key decodes
/// 2. Blob has exactly two segments
/// 3. Signature matches the payload segment
/// 4. Payload decodes
/// 5. Payload email and domain equal the record's (exact)
/// 6. Payload has not expired
pub fn verify_licence(
    record: &LicenceRecord,
    clock: &dyn Clock,
) -> Result<LicencePayload, LicenceFault> {
    let verifying_key = decode_public_key(record.public_key())?;
    let signed = split_licence(record.licence())?;

    verify_ed25519(
        signed.signature_b64,
        signed.payload_b64.as_bytes(),
        &verifying_key,
    )?;

    let payload = decode_payload(signed.payload_b64)?;

    if payload.email != record.email() {
        return Err(LicenceFault::NotIssuedFor {
            field: "email",
            value: record.email().to_string(),
        });
    }
    if payload.domain != record.domain() {
        return Err(LicenceFault::NotIssuedFor {
            field: "domain",
            value: record.domain().to_string(),
        });
    }

    if payload.is_expired_at(clock.now_utc()) {
        if let Some(expired_at) = payload.expires_at {
            return Err(LicenceFault::Expired { expired_at });
        }
    }

    Ok(payload)
}
