//! Builder for configuring fetch-through engine instances.

use std::sync::Arc;
use std::time::Duration;

use super::engine::{ErrorPolicy, FetchThrough};
use crate::store::{CacheStore, MemoryStore};
use crate::upstream::{self, HttpUpstreamClient, UpstreamClient};
use crate::{MuninnError, Result};

/// Main entry point for creating engine instances.
pub struct Muninn;

impl Muninn {
    /// Create a new builder for configuring the engine.
    pub fn builder() -> MuninnBuilder {
        MuninnBuilder::new()
    }
}

/// Builder for configuring engine instances.
///
/// ```rust
/// # use muninn::Muninn;
/// let engine = Muninn::builder()
///     .upstream_root("http://api.eve-online.com")
///     .single_flight(true)
///     .build()
///     .unwrap();
/// # let _ = engine;
/// ```
pub struct MuninnBuilder {
    upstream_root: Option<String>,
    upstream_timeout: Duration,
    upstream: Option<Arc<dyn UpstreamClient>>,
    store: Option<Arc<dyn CacheStore>>,
    error_policy: ErrorPolicy,
    retry_transient: bool,
    single_flight: bool,
}

impl MuninnBuilder {
    pub fn new() -> Self {
        Self {
            upstream_root: None,
            upstream_timeout: upstream::DEFAULT_TIMEOUT,
            upstream: None,
            store: None,
            error_policy: ErrorPolicy::default(),
            retry_transient: false,
            single_flight: false,
        }
    }

    /// Set the upstream root URL (e.g. `http://api.eve-online.com`).
    ///
    /// Ignored when an explicit [`upstream_client`](Self::upstream_client)
    /// is injected.
    pub fn upstream_root(mut self, root: impl Into<String>) -> Self {
        self.upstream_root = Some(root.into());
        self
    }

    /// Set the timeout for upstream calls (default: 30s).
    pub fn upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Inject a custom upstream client (for tests or non-HTTP transports).
    pub fn upstream_client(mut self, client: Arc<dyn UpstreamClient>) -> Self {
        self.upstream = Some(client);
        self
    }

    /// Inject a cache store backend (default: in-memory [`MemoryStore`]).
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set how non-success upstream responses are treated.
    ///
    /// With [`ErrorPolicy::CacheEverything`] (default), error bodies are
    /// cached and served like any success. [`ErrorPolicy::SurfaceErrors`]
    /// returns them as typed errors without caching.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Enable one bounded retry on transient (transport-level) upstream
    /// errors. Off by default; status errors are never retried.
    pub fn retry_transient(mut self, enabled: bool) -> Self {
        self.retry_transient = enabled;
        self
    }

    /// Enable per-key in-flight coalescing on the miss path.
    ///
    /// Off by default: concurrent misses for the same key independently call
    /// upstream. When enabled, one leader fetches while late arrivals wait
    /// and are served the stored entry.
    pub fn single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    /// Build the engine, validating the configuration.
    pub fn build(self) -> Result<FetchThrough> {
        let upstream: Arc<dyn UpstreamClient> = match self.upstream {
            Some(client) => client,
            None => {
                let root = self.upstream_root.ok_or_else(|| {
                    MuninnError::Configuration("no upstream root configured".to_string())
                })?;
                Arc::new(HttpUpstreamClient::with_timeout(root, self.upstream_timeout)?)
            }
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn CacheStore>);

        Ok(FetchThrough::new(
            store,
            upstream,
            self.error_policy,
            self.retry_transient,
            self.single_flight,
        ))
    }
}

impl Default for MuninnBuilder {
    fn default() -> Self {
        Self::new()
    }
}
