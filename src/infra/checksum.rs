//! Keyed checksum engine for the gateway contract.
//!
//! The gateway authenticates payloads with a SHA-256 digest of
//! `payload || salt_key`, transported as `"<hex digest>###<salt index>"` in the
//! `X-VERIFY` header. The same construction signs outgoing order payloads and
//! verifies inbound callbacks.

use sha2::{Digest, Sha256};

/// Separator between the hex digest and the salt index in an `X-VERIFY` value.
const VERIFY_SEPARATOR: &str = "###";

/// Deterministic keyed digest: lowercase hex SHA-256 of `payload || secret`.
pub fn compute_checksum(payload: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recomputes the checksum and compares in constant time.
pub fn verify_checksum(payload: &str, provided: &str, secret: &str) -> bool {
    constant_time_compare(provided, &compute_checksum(payload, secret))
}

/// Builds the `"<checksum>###<saltIndex>"` value sent alongside an order payload.
pub fn sign_payload(payload: &str, secret: &str, salt_index: &str) -> String {
    format!(
        "{}{}{}",
        compute_checksum(payload, secret),
        VERIFY_SEPARATOR,
        salt_index
    )
}

/// Parsed `X-VERIFY` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyHeader {
    pub checksum: String,
    pub salt_index: String,
}

impl VerifyHeader {
    /// Splits a raw header value on `###`. Returns `None` when the separator is
    /// absent or either side is empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (checksum, salt_index) = raw.split_once(VERIFY_SEPARATOR)?;
        if checksum.is_empty() || salt_index.is_empty() {
            return None;
        }
        Some(Self {
            checksum: checksum.to_string(),
            salt_index: salt_index.to_string(),
        })
    }
}

pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
