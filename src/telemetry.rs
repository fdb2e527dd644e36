//! Telemetry metric name constants.
//!
//! Centralised metric names for muninn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `muninn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `endpoint`: the endpoint path (e.g. `/eve/SkillTree.xml.aspx`)
//! - `operation`: store operation for storage errors ("find" | "insert" | "delete")
//! - `outcome`: request outcome ("ok" | "error")

/// Total requests handled by the fetch-through engine.
///
/// Labels: `endpoint`, `outcome` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "muninn_requests_total";

/// End-to-end engine request duration in seconds.
///
/// Labels: `endpoint`.
pub const REQUEST_DURATION_SECONDS: &str = "muninn_request_duration_seconds";

/// Total cache hits (a fresh entry short-circuited the upstream call).
///
/// Labels: `endpoint`.
pub const CACHE_HITS_TOTAL: &str = "muninn_cache_hits_total";

/// Total cache misses (no entry, or the newest entry was stale).
///
/// Labels: `endpoint`.
pub const CACHE_MISSES_TOTAL: &str = "muninn_cache_misses_total";

/// Total stale entries evicted before a live fetch.
///
/// Labels: `endpoint`.
pub const EVICTIONS_TOTAL: &str = "muninn_evictions_total";

/// Total upstream HTTP calls issued (retries counted separately).
///
/// Labels: `endpoint`.
pub const UPSTREAM_REQUESTS_TOTAL: &str = "muninn_upstream_requests_total";

/// Total upstream failures surfaced to callers (transport errors, plus
/// non-success statuses when the error policy surfaces them).
///
/// Labels: `endpoint`.
pub const UPSTREAM_ERRORS_TOTAL: &str = "muninn_upstream_errors_total";

/// Total retry attempts after transient upstream errors (not counting the
/// initial request).
///
/// Labels: `endpoint`.
pub const RETRIES_TOTAL: &str = "muninn_retries_total";

/// Total cache store failures absorbed in degraded mode.
///
/// Labels: `operation` ("find" | "insert" | "delete").
pub const STORE_ERRORS_TOTAL: &str = "muninn_store_errors_total";
