//! Request gating policy: exemptions and licence checks.

pub mod enforcement;
pub mod exemption;
