//! Integration tests for the fetch-through engine: cache hits, TTL expiry,
//! parameter handling, sanitation, error policy, degraded mode, retry, and
//! single-flight coalescing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use muninn::fingerprint::fingerprint;
use muninn::{
    CacheEntry, CacheStore, EndpointDescriptor, ErrorPolicy, FetchThrough, MemoryStore, Muninn,
    MuninnError, Result, UpstreamClient, UpstreamResponse,
};

/// Upstream double that counts calls and records the last query it saw.
struct CountingUpstream {
    calls: AtomicUsize,
    status: u16,
    body: String,
    last_query: Mutex<Vec<(String, String)>>,
    delay: Option<Duration>,
}

impl CountingUpstream {
    fn new(body: &str) -> Arc<Self> {
        Self::with_status(200, body)
    }

    fn with_status(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            status,
            body: body.to_string(),
            last_query: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    fn slow(body: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            status: 200,
            body: body.to_string(),
            last_query: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_query(&self) -> Vec<(String, String)> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamClient for CountingUpstream {
    async fn fetch(&self, _path: &str, query: &[(String, String)]) -> Result<UpstreamResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = query.to_vec();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(UpstreamResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Upstream double that fails with a transport error `failures` times, then
/// succeeds.
struct FlakyUpstream {
    calls: AtomicUsize,
    failures: usize,
    body: String,
}

impl FlakyUpstream {
    fn new(failures: usize, body: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failures,
            body: body.to_string(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamClient for FlakyUpstream {
    async fn fetch(&self, _path: &str, _query: &[(String, String)]) -> Result<UpstreamResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            return Err(MuninnError::Upstream("connection reset".to_string()));
        }
        Ok(UpstreamResponse {
            status: 200,
            body: self.body.clone(),
        })
    }
}

/// Store double whose every operation fails.
struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn find(&self, _endpoint: &str, _fingerprint: &str) -> Result<Vec<CacheEntry>> {
        Err(MuninnError::Storage("store offline".to_string()))
    }

    async fn insert(&self, _entry: CacheEntry) -> Result<()> {
        Err(MuninnError::Storage("store offline".to_string()))
    }

    async fn delete(&self, _entry: &CacheEntry) -> Result<()> {
        Err(MuninnError::Storage("store offline".to_string()))
    }
}

fn descriptor(name: &str, parameters: &[&str], ttl: Duration) -> EndpointDescriptor {
    EndpointDescriptor::new(name, parameters, ttl)
}

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn engine(upstream: Arc<CountingUpstream>) -> (FetchThrough, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = Muninn::builder()
        .upstream_client(upstream)
        .store(store.clone())
        .build()
        .unwrap();
    (engine, store)
}

#[tokio::test]
async fn miss_fetches_stores_and_returns() {
    let upstream = CountingUpstream::new("<result/>");
    let (engine, store) = engine(upstream.clone());
    let d = descriptor("/char/SkillQueue.xml.aspx", &["userID", "apiKey"], Duration::from_secs(3600));

    let payload = engine
        .handle(&d, &params(&[("userID", "123"), ("apiKey", "secret")]))
        .await
        .unwrap();

    assert_eq!(payload, "<result/>");
    assert_eq!(upstream.calls(), 1);

    let fp = fingerprint(["123", "secret"]);
    let stored = store.find("/char/SkillQueue.xml.aspx", &fp).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].payload, "<result/>");
}

#[tokio::test]
async fn fresh_hit_skips_upstream() {
    let upstream = CountingUpstream::new("<result/>");
    let (engine, _store) = engine(upstream.clone());
    let d = descriptor("/e", &["userID"], Duration::from_secs(3600));
    let p = params(&[("userID", "123")]);

    let first = engine.handle(&d, &p).await.unwrap();
    let second = engine.handle(&d, &p).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn stale_entry_is_evicted_and_refetched() {
    let upstream = CountingUpstream::new("<new/>");
    let (engine, store) = engine(upstream.clone());
    let d = descriptor("/e", &["userID"], Duration::from_secs(900));
    let fp = fingerprint(["123"]);

    // Entry older than its 15 minute TTL.
    store
        .insert(CacheEntry {
            endpoint: "/e".to_string(),
            fingerprint: fp.clone(),
            created_at: SystemTime::now() - Duration::from_secs(960),
            payload: "<old/>".to_string(),
        })
        .await
        .unwrap();

    let payload = engine.handle(&d, &params(&[("userID", "123")])).await.unwrap();

    assert_eq!(payload, "<new/>");
    assert_eq!(upstream.calls(), 1);

    // The stale generation is gone; only the refetched one remains.
    let stored = store.find("/e", &fp).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].payload, "<new/>");
}

#[tokio::test]
async fn undeclared_parameters_are_ignored() {
    let upstream = CountingUpstream::new("<result/>");
    let (engine, _store) = engine(upstream.clone());
    let d = descriptor("/e", &["userID"], Duration::from_secs(3600));

    engine
        .handle(&d, &params(&[("userID", "123"), ("noise", "a")]))
        .await
        .unwrap();
    engine
        .handle(&d, &params(&[("userID", "123"), ("noise", "b")]))
        .await
        .unwrap();

    // Same cache key: the noise parameter changed nothing.
    assert_eq!(upstream.calls(), 1);
    assert_eq!(
        upstream.last_query(),
        vec![("userID".to_string(), "123".to_string())]
    );
}

#[tokio::test]
async fn missing_declared_parameter_acts_as_empty() {
    let upstream = CountingUpstream::new("<result/>");
    let (engine, _store) = engine(upstream.clone());
    let d = descriptor("/e", &["userID", "apiKey"], Duration::from_secs(3600));

    engine.handle(&d, &params(&[("userID", "123")])).await.unwrap();
    engine
        .handle(&d, &params(&[("userID", "123"), ("apiKey", "")]))
        .await
        .unwrap();

    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn zero_parameter_endpoint_shares_one_entry() {
    let upstream = CountingUpstream::new("<result/>");
    let (engine, store) = engine(upstream.clone());
    let d = descriptor("/eve/SkillTree.xml.aspx", &[], Duration::from_secs(86400));

    engine.handle(&d, &params(&[("userID", "1")])).await.unwrap();
    engine.handle(&d, &params(&[("userID", "2")])).await.unwrap();
    engine.handle(&d, &HashMap::new()).await.unwrap();

    assert_eq!(upstream.calls(), 1);
    assert!(upstream.last_query().is_empty());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn single_quotes_are_sanitized_at_write_time() {
    let upstream = CountingUpstream::new("<row name='Jita IV'/>");
    let (engine, _store) = engine(upstream.clone());
    let d = descriptor("/e", &[], Duration::from_secs(3600));

    let first = engine.handle(&d, &HashMap::new()).await.unwrap();
    let second = engine.handle(&d, &HashMap::new()).await.unwrap();

    assert_eq!(first, "<row name=&apos;Jita IV&apos;/>");
    assert_eq!(second, first);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn error_body_is_cached_by_default() {
    let upstream = CountingUpstream::with_status(500, "<error code=\"520\"/>");
    let (engine, _store) = engine(upstream.clone());
    let d = descriptor("/e", &[], Duration::from_secs(3600));

    let first = engine.handle(&d, &HashMap::new()).await.unwrap();
    let second = engine.handle(&d, &HashMap::new()).await.unwrap();

    assert_eq!(first, "<error code=\"520\"/>");
    assert_eq!(second, first);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn surface_errors_policy_does_not_cache() {
    let upstream = CountingUpstream::with_status(500, "<error/>");
    let store = Arc::new(MemoryStore::new());
    let engine = Muninn::builder()
        .upstream_client(upstream.clone())
        .store(store.clone())
        .error_policy(ErrorPolicy::SurfaceErrors)
        .build()
        .unwrap();
    let d = descriptor("/e", &[], Duration::from_secs(3600));

    let err = engine.handle(&d, &HashMap::new()).await.unwrap_err();
    assert!(matches!(err, MuninnError::UpstreamStatus { status: 500 }));

    // Nothing was cached, so the next request hits upstream again.
    let err = engine.handle(&d, &HashMap::new()).await.unwrap_err();
    assert!(matches!(err, MuninnError::UpstreamStatus { status: 500 }));
    assert_eq!(upstream.calls(), 2);
    assert!(store.is_empty());
}

#[tokio::test]
async fn failing_store_degrades_to_pass_through() {
    let upstream = CountingUpstream::new("<result/>");
    let engine = Muninn::builder()
        .upstream_client(upstream.clone())
        .store(Arc::new(FailingStore))
        .build()
        .unwrap();
    let d = descriptor("/e", &["userID"], Duration::from_secs(3600));
    let p = params(&[("userID", "123")]);

    // Every request is served; each one goes upstream.
    assert_eq!(engine.handle(&d, &p).await.unwrap(), "<result/>");
    assert_eq!(engine.handle(&d, &p).await.unwrap(), "<result/>");
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test]
async fn transport_error_is_not_retried_by_default() {
    let upstream = FlakyUpstream::new(1, "<result/>");
    let engine = Muninn::builder()
        .upstream_client(upstream.clone())
        .build()
        .unwrap();
    let d = descriptor("/e", &[], Duration::from_secs(3600));

    let err = engine.handle(&d, &HashMap::new()).await.unwrap_err();
    assert!(matches!(err, MuninnError::Upstream(_)));
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn transport_error_is_retried_once_when_enabled() {
    let upstream = FlakyUpstream::new(1, "<result/>");
    let engine = Muninn::builder()
        .upstream_client(upstream.clone())
        .retry_transient(true)
        .build()
        .unwrap();
    let d = descriptor("/e", &[], Duration::from_secs(3600));

    let payload = engine.handle(&d, &HashMap::new()).await.unwrap();
    assert_eq!(payload, "<result/>");
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn retry_is_bounded_to_one_attempt() {
    let upstream = FlakyUpstream::new(2, "<result/>");
    let engine = Muninn::builder()
        .upstream_client(upstream.clone())
        .retry_transient(true)
        .build()
        .unwrap();
    let d = descriptor("/e", &[], Duration::from_secs(3600));

    let err = engine.handle(&d, &HashMap::new()).await.unwrap_err();
    assert!(matches!(err, MuninnError::Upstream(_)));
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn single_flight_coalesces_concurrent_misses() {
    let upstream = CountingUpstream::slow("<result/>", Duration::from_millis(50));
    let engine = Muninn::builder()
        .upstream_client(upstream.clone())
        .single_flight(true)
        .build()
        .unwrap();
    let d = descriptor("/e", &["userID"], Duration::from_secs(3600));
    let p = params(&[("userID", "123")]);

    let (a, b, c) = tokio::join!(engine.handle(&d, &p), engine.handle(&d, &p), engine.handle(&d, &p));

    assert_eq!(a.unwrap(), "<result/>");
    assert_eq!(b.unwrap(), "<result/>");
    assert_eq!(c.unwrap(), "<result/>");
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn single_flight_keeps_distinct_keys_independent() {
    let upstream = CountingUpstream::slow("<result/>", Duration::from_millis(50));
    let engine = Muninn::builder()
        .upstream_client(upstream.clone())
        .single_flight(true)
        .build()
        .unwrap();
    let d = descriptor("/e", &["userID"], Duration::from_secs(3600));

    let p1 = params(&[("userID", "1")]);
    let p2 = params(&[("userID", "2")]);
    let (a, b) = tokio::join!(engine.handle(&d, &p1), engine.handle(&d, &p2));

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(upstream.calls(), 2);
}
