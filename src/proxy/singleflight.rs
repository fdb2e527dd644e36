//! Per-key in-flight coalescing for the miss path.
//!
//! When enabled, the engine serializes request processing per
//! (endpoint, fingerprint): the first arrival holds the key's async lock
//! through its upstream fetch, and late arrivals wait on the same lock, then
//! re-check the cache and are served the freshly stored entry instead of
//! issuing their own upstream call. Off by default; without it, concurrent
//! misses for the same key each call upstream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

type Key = (String, String);

/// Lazily populated map of per-key async locks.
pub(crate) struct KeyLocks {
    locks: Mutex<HashMap<Key, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the lock for a key, creating it on first use.
    pub(crate) fn lock_for(&self, endpoint: &str, fingerprint: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry((endpoint.to_string(), fingerprint.to_string()))
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Prune the map entry once no caller still holds a clone.
    ///
    /// Callers must drop their `Arc` before calling this.
    pub(crate) fn release(&self, endpoint: &str, fingerprint: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let key = (endpoint.to_string(), fingerprint.to_string());
        if let Some(lock) = locks.get(&key) {
            // Only the map's own reference remains.
            if Arc::strong_count(lock) == 1 {
                locks.remove(&key);
            }
        }
    }
}
