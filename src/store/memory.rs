//! In-memory reference implementation of [`CacheStore`].

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{CacheEntry, CacheStore};
use crate::{MuninnError, Result};

type Key = (String, String);

/// Thread-safe in-memory cache store.
///
/// Entries are bucketed per (endpoint, fingerprint); each bucket is kept
/// sorted newest first at insert time, so [`find`](CacheStore::find) is a
/// clone of the bucket. Suitable for the scale this proxy targets (low query
/// volume, small working set per endpoint) and as the reference semantics
/// for persistent backends.
#[derive(Default)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<Key, Vec<CacheEntry>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored entries across all keys.
    ///
    /// Recovers from lock poisoning; the map itself stays well-formed even
    /// if a holder panicked.
    pub fn len(&self) -> usize {
        let buckets = self.buckets.read().unwrap_or_else(|e| e.into_inner());
        buckets.values().map(Vec::len).sum()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn find(&self, endpoint: &str, fingerprint: &str) -> Result<Vec<CacheEntry>> {
        let buckets = self
            .buckets
            .read()
            .map_err(|_| MuninnError::Storage("cache lock poisoned".to_string()))?;
        let key = (endpoint.to_string(), fingerprint.to_string());
        Ok(buckets.get(&key).cloned().unwrap_or_default())
    }

    async fn insert(&self, entry: CacheEntry) -> Result<()> {
        let mut buckets = self
            .buckets
            .write()
            .map_err(|_| MuninnError::Storage("cache lock poisoned".to_string()))?;
        let key = (entry.endpoint.clone(), entry.fingerprint.clone());
        let bucket = buckets.entry(key).or_default();
        // Keep newest first; ties go ahead of existing entries.
        let position = bucket
            .iter()
            .position(|e| e.created_at <= entry.created_at)
            .unwrap_or(bucket.len());
        bucket.insert(position, entry);
        Ok(())
    }

    async fn delete(&self, entry: &CacheEntry) -> Result<()> {
        let mut buckets = self
            .buckets
            .write()
            .map_err(|_| MuninnError::Storage("cache lock poisoned".to_string()))?;
        let key = (entry.endpoint.clone(), entry.fingerprint.clone());
        if let Some(bucket) = buckets.get_mut(&key) {
            bucket.retain(|e| e.created_at != entry.created_at);
            if bucket.is_empty() {
                buckets.remove(&key);
            }
        }
        Ok(())
    }
}
