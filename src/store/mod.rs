//! Cache storage: entries, the store seam, and the in-memory reference
//! implementation.
//!
//! The engine consumes storage through the [`CacheStore`] trait so that the
//! in-memory [`MemoryStore`] can be swapped for a persistent backend (sqlite,
//! redis, ...) without touching the fetch-through logic. The trait is
//! deliberately small: point lookup by composite key, insert, delete. There
//! is no update-in-place; stale entries are replaced wholesale by a
//! delete-then-insert sequence, and no atomicity is required between the two
//! (a brief window with no entry for a key is acceptable; a reader arriving
//! in that window triggers its own fetch).

pub mod memory;

pub use memory::MemoryStore;

use std::time::SystemTime;

use async_trait::async_trait;

use crate::Result;

/// One cached upstream response.
///
/// Keyed by (endpoint, fingerprint, creation time). Created by the engine
/// after a successful upstream call, read on every request, deleted when
/// found stale. Multiple generations for the same (endpoint, fingerprint)
/// may physically coexist; only the newest is authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Endpoint path this entry belongs to (the storage partition key).
    pub endpoint: String,
    /// Fingerprint of the sanitized declared parameter values.
    pub fingerprint: String,
    /// When the entry was written. Freshness is `created_at + ttl > now`.
    pub created_at: SystemTime,
    /// The stored payload, sanitized once at write time. Typically XML.
    pub payload: String,
}

/// Storage seam consumed by the fetch-through engine.
///
/// Implementations must be safe for concurrent use; the engine performs no
/// locking of its own around store calls.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// All entries for (endpoint, fingerprint), ordered newest first.
    ///
    /// Returns an empty vector when nothing is stored for the key.
    async fn find(&self, endpoint: &str, fingerprint: &str) -> Result<Vec<CacheEntry>>;

    /// Insert a new entry. Existing generations for the same key are kept.
    async fn insert(&self, entry: CacheEntry) -> Result<()>;

    /// Delete one entry, identified by (endpoint, fingerprint, created_at).
    ///
    /// Deleting an entry that is no longer present is not an error.
    async fn delete(&self, entry: &CacheEntry) -> Result<()>;
}
