//! TTL freshness rule for cached entries.
//!
//! An entry is fresh iff `created_at + ttl > now`. Strictly greater, so an
//! entry exactly `ttl` old is already stale. The engine evaluates freshness
//! once per request against a single snapshot of `now` taken at the start of
//! that request's processing; it is never re-evaluated mid-flight.

use std::time::{Duration, SystemTime};

/// Whether an entry created at `created_at` with the given `ttl` is still
/// servable at `now`.
pub fn is_fresh(created_at: SystemTime, ttl: Duration, now: SystemTime) -> bool {
    match created_at.checked_add(ttl) {
        Some(expiry) => expiry > now,
        // ttl overflows the SystemTime range: the entry cannot expire
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(900);

    #[test]
    fn fresh_before_expiry() {
        let created = SystemTime::UNIX_EPOCH;
        let now = created + Duration::from_secs(899);
        assert!(is_fresh(created, TTL, now));
    }

    #[test]
    fn stale_exactly_at_ttl() {
        // Strict inequality: an entry exactly ttl old is stale.
        let created = SystemTime::UNIX_EPOCH;
        let now = created + TTL;
        assert!(!is_fresh(created, TTL, now));
    }

    #[test]
    fn stale_after_expiry() {
        let created = SystemTime::UNIX_EPOCH;
        let now = created + Duration::from_secs(901);
        assert!(!is_fresh(created, TTL, now));
    }

    #[test]
    fn fresh_at_creation_instant() {
        let created = SystemTime::UNIX_EPOCH;
        assert!(is_fresh(created, TTL, created));
    }

    #[test]
    fn overflowing_ttl_never_expires() {
        let created = SystemTime::now();
        assert!(is_fresh(created, Duration::MAX, created + Duration::from_secs(1)));
    }
}
