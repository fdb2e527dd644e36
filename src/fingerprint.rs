//! Cache-key fingerprints for endpoint parameter sets.
//!
//! A fingerprint is a hex-encoded SHA-256 digest over the *sanitized
//! concatenation* of an endpoint's declared parameter values, taken in
//! declaration order. Two requests with identical parameter values (after
//! sanitation) map to the same fingerprint and share a cache entry. The
//! scheme is case-sensitive, order-sensitive and exact-match; sanitation is
//! the only normalization applied.
//!
//! The digest is stable across runs and processes, so fingerprints remain
//! valid in any persistent [`CacheStore`](crate::CacheStore) backend.

use sha2::{Digest, Sha256};

/// Strip every character that is not ASCII alphanumeric or a hyphen.
///
/// Applied to each parameter value before it contributes to the fingerprint.
/// The outbound upstream query is built from the *raw* values independently;
/// sanitation only shapes the cache key.
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Compute the fingerprint for an ordered sequence of raw parameter values.
///
/// Each value is sanitized and fed to the digest in order, with no delimiter
/// between values. The missing delimiter means two different parameter splits
/// that concatenate to the same string collide (`["ab", "c"]` vs `["a", "bc"]`);
/// this ambiguity is kept deliberately so that fingerprints stay compatible
/// with previously stored entries. Absent parameters contribute as empty
/// strings.
///
/// Pure function of the ordered values. An endpoint with zero declared
/// parameters yields the same fingerprint for every caller: one global
/// shared cache entry.
pub fn fingerprint<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Sha256::new();
    for value in values {
        hasher.update(sanitize(value).as_bytes());
    }
    hex::encode(hasher.finalize())
}
