//! Content fingerprints used as a cheap equality proxy for entry payloads.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `payload`.
///
/// Deterministic and side-effect free. Only used to tell whether a payload
/// changed, never for anything security related.
pub fn fingerprint(payload: &str) -> String {
    let mut h = Sha256::new();
    h.update(payload.as_bytes());
    hex::encode(h.finalize())
}
