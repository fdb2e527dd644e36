//! Fetch-through engine: lookup → serve-or-evict → fetch → populate.
//!
//! The heart of the proxy. Per request the engine computes the parameter
//! fingerprint, consults the cache store, serves a fresh entry as-is, evicts
//! a stale one, and on a miss calls upstream, stores the sanitized response,
//! and returns it. Repeated identical requests within the TTL window make
//! zero additional upstream calls.
//!
//! Cache store failures never take down the read/forward path: a failed read
//! is treated as a miss and a failed write is logged while the fetched
//! payload is still served (degraded mode).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, warn};

use super::singleflight::KeyLocks;
use crate::registry::EndpointDescriptor;
use crate::store::{CacheEntry, CacheStore};
use crate::upstream::{UpstreamClient, UpstreamResponse};
use crate::{MuninnError, Result, fingerprint, freshness, telemetry};

/// Delay before the single bounded retry on transient upstream errors.
const RETRY_DELAY: Duration = Duration::from_millis(200);

/// How the engine treats non-success upstream responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Cache and serve whatever bytes the upstream returned, regardless of
    /// status. Note that this means every caller within the TTL window is
    /// served a cached error body.
    #[default]
    CacheEverything,
    /// Refuse to cache non-2xx bodies; surface them to the caller as
    /// [`MuninnError::UpstreamStatus`] instead.
    SurfaceErrors,
}

/// The fetch-through engine.
///
/// Construct via [`Muninn::builder()`](crate::Muninn::builder). Safe to share
/// behind an `Arc`; requests are handled independently with no mutual
/// exclusion unless single-flight coalescing is enabled.
pub struct FetchThrough {
    store: Arc<dyn CacheStore>,
    upstream: Arc<dyn UpstreamClient>,
    error_policy: ErrorPolicy,
    retry_transient: bool,
    flights: Option<KeyLocks>,
}

impl FetchThrough {
    pub(crate) fn new(
        store: Arc<dyn CacheStore>,
        upstream: Arc<dyn UpstreamClient>,
        error_policy: ErrorPolicy,
        retry_transient: bool,
        single_flight: bool,
    ) -> Self {
        Self {
            store,
            upstream,
            error_policy,
            retry_transient,
            flights: single_flight.then(KeyLocks::new),
        }
    }

    /// Handle one request for a resolved endpoint.
    ///
    /// `params` holds the caller-supplied parameter values; declared
    /// parameters absent from it are treated as empty strings, never as an
    /// error, and undeclared parameters are ignored entirely (they neither
    /// reach the fingerprint nor the upstream query).
    ///
    /// Returns the payload to serve. The HTTP layer is responsible for the
    /// fixed XML/UTF-8 content type.
    pub async fn handle(
        &self,
        descriptor: &EndpointDescriptor,
        params: &HashMap<String, String>,
    ) -> Result<String> {
        let started = Instant::now();
        let values: Vec<&str> = descriptor
            .parameter_names
            .iter()
            .map(|name| params.get(name).map(String::as_str).unwrap_or(""))
            .collect();
        let fp = fingerprint::fingerprint(values.iter().copied());

        let result = match self.flights {
            Some(ref flights) => {
                // Late arrivals wait here, then find the leader's entry in
                // the cache re-check inside lookup_or_fetch.
                let lock = flights.lock_for(&descriptor.name, &fp);
                let guard = lock.lock().await;
                let result = self.lookup_or_fetch(descriptor, params, &fp).await;
                drop(guard);
                drop(lock);
                flights.release(&descriptor.name, &fp);
                result
            }
            None => self.lookup_or_fetch(descriptor, params, &fp).await,
        };

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "endpoint" => descriptor.name.clone(),
            "outcome" => outcome,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "endpoint" => descriptor.name.clone(),
        )
        .record(started.elapsed().as_secs_f64());

        result
    }

    /// The core sequence: `Lookup → {Fresh: Serve} | {Stale: Evict→Fetch} |
    /// {Missing: Fetch}`.
    async fn lookup_or_fetch(
        &self,
        descriptor: &EndpointDescriptor,
        params: &HashMap<String, String>,
        fp: &str,
    ) -> Result<String> {
        // Single freshness snapshot for this request; also the timestamp a
        // freshly stored entry is stamped with.
        let now = SystemTime::now();

        let entries = match self.store.find(&descriptor.name, fp).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(endpoint = %descriptor.name, error = %e, "cache read failed, treating as miss");
                metrics::counter!(telemetry::STORE_ERRORS_TOTAL, "operation" => "find")
                    .increment(1);
                Vec::new()
            }
        };

        // Only the newest generation is authoritative. Older duplicates are
        // left untouched; a single generation is inspected and evicted per
        // request.
        if let Some(newest) = entries.first() {
            if freshness::is_fresh(newest.created_at, descriptor.ttl, now) {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL,
                    "endpoint" => descriptor.name.clone(),
                )
                .increment(1);
                debug!(endpoint = %descriptor.name, "cache hit");
                return Ok(newest.payload.clone());
            }

            metrics::counter!(telemetry::EVICTIONS_TOTAL,
                "endpoint" => descriptor.name.clone(),
            )
            .increment(1);
            debug!(endpoint = %descriptor.name, "stale entry evicted");
            if let Err(e) = self.store.delete(newest).await {
                warn!(endpoint = %descriptor.name, error = %e, "stale eviction failed");
                metrics::counter!(telemetry::STORE_ERRORS_TOTAL, "operation" => "delete")
                    .increment(1);
            }
        }

        metrics::counter!(telemetry::CACHE_MISSES_TOTAL,
            "endpoint" => descriptor.name.clone(),
        )
        .increment(1);

        // Outbound query: raw declared values, declaration order, absent → "".
        let query: Vec<(String, String)> = descriptor
            .parameter_names
            .iter()
            .map(|name| (name.clone(), params.get(name).cloned().unwrap_or_default()))
            .collect();

        let response = self.fetch_upstream(&descriptor.name, &query).await?;

        if self.error_policy == ErrorPolicy::SurfaceErrors && !response.is_success() {
            metrics::counter!(telemetry::UPSTREAM_ERRORS_TOTAL,
                "endpoint" => descriptor.name.clone(),
            )
            .increment(1);
            return Err(MuninnError::UpstreamStatus {
                status: response.status,
            });
        }

        let payload = sanitize_payload(&response.body);
        let entry = CacheEntry {
            endpoint: descriptor.name.clone(),
            fingerprint: fp.to_string(),
            created_at: now,
            payload: payload.clone(),
        };
        if let Err(e) = self.store.insert(entry).await {
            warn!(endpoint = %descriptor.name, error = %e, "cache write failed, serving uncached response");
            metrics::counter!(telemetry::STORE_ERRORS_TOTAL, "operation" => "insert").increment(1);
        }

        Ok(payload)
    }

    /// Issue the upstream call, with at most one bounded retry on transport
    /// errors when enabled. Status errors are never retried.
    async fn fetch_upstream(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamResponse> {
        metrics::counter!(telemetry::UPSTREAM_REQUESTS_TOTAL, "endpoint" => path.to_string())
            .increment(1);
        match self.upstream.fetch(path, query).await {
            Ok(response) => Ok(response),
            Err(e @ MuninnError::Upstream(_)) if self.retry_transient => {
                warn!(endpoint = path, error = %e, "retrying after transient upstream error");
                metrics::counter!(telemetry::RETRIES_TOTAL, "endpoint" => path.to_string())
                    .increment(1);
                tokio::time::sleep(RETRY_DELAY).await;
                metrics::counter!(telemetry::UPSTREAM_REQUESTS_TOTAL,
                    "endpoint" => path.to_string(),
                )
                .increment(1);
                self.upstream.fetch(path, query).await.inspect_err(|_| {
                    metrics::counter!(telemetry::UPSTREAM_ERRORS_TOTAL,
                        "endpoint" => path.to_string(),
                    )
                    .increment(1);
                })
            }
            Err(e) => {
                metrics::counter!(telemetry::UPSTREAM_ERRORS_TOTAL,
                    "endpoint" => path.to_string(),
                )
                .increment(1);
                Err(e)
            }
        }
    }
}

/// Replace the one character the storage layer cannot safely hold.
///
/// Applied once at write time; the replacement text contains no `'`, so the
/// pass is idempotent and stable across repeated reads of the same entry.
fn sanitize_payload(body: &str) -> String {
    body.replace('\'', "&apos;")
}
