//! Credential digest for the access gate.
//!
//! Candidates are never stored or compared in plaintext — they are SHA-256
//! hashed and the hex digests compared in constant time. The same function
//! produces the expected digest during setup (`docvault digest`), so the
//! check and the configuration can never disagree on encoding.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hash a candidate credential with SHA-256, returning the lowercase
/// hex-encoded digest.
///
/// The candidate is treated as opaque bytes: no trimming, case-folding, or
/// locale transforms are applied before hashing. Deterministic — identical
/// input yields identical output across runs.
#[must_use]
pub fn credential_digest(candidate: &str) -> String {
    let digest = Sha256::digest(candidate.as_bytes());
    hex::encode(digest)
}

/// Compare two hex digests in constant time.
///
/// Exact-byte equality — case-sensitive hex. Returns `false` for digests of
/// differing length without leaking where they diverge.
#[must_use]
pub fn digests_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
