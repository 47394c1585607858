//! Cryptographic primitives for licence verification.

pub mod digest;
pub mod licence;
pub mod verify;
