//! Upstream HTTP client for the proxied API.
//!
//! One operation: a blocking-from-the-caller's-view GET against
//! `<root><path>?<urlencoded declared parameters>`. The outbound query
//! carries the *raw* parameter values (URL-encoded by reqwest), not the
//! sanitized fingerprint input, and only the parameters declared for the
//! endpoint; undeclared caller parameters are never forwarded.
//!
//! The status code is surfaced alongside the body so the engine's error
//! policy can distinguish non-success responses without being forced to.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{MuninnError, Result};

/// Default timeout for upstream calls. Expiry is an upstream failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw upstream response: status and body, nothing interpreted.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, decoded as text.
    pub body: String,
}

impl UpstreamResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam for the upstream HTTP call, mockable in tests.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// GET `<root><path>` with the given query pairs.
    ///
    /// Transport failures (unreachable, reset, timeout) return
    /// [`MuninnError::Upstream`]; any HTTP status is a successful fetch.
    async fn fetch(&self, path: &str, query: &[(String, String)]) -> Result<UpstreamResponse>;
}

/// reqwest-backed [`UpstreamClient`].
#[derive(Clone)]
pub struct HttpUpstreamClient {
    http: Client,
    base_url: String,
}

impl HttpUpstreamClient {
    /// Create a client for the given upstream root with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom timeout (for tests and tuning).
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MuninnError::Configuration(format!("failed to build HTTP client: {e}")))?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { http, base_url })
    }

    /// The upstream root this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn fetch(&self, path: &str, query: &[(String, String)]) -> Result<UpstreamResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MuninnError::Upstream(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| MuninnError::Upstream(e.to_string()))?;

        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = HttpUpstreamClient::new("http://example.test///").unwrap();
        assert_eq!(client.base_url(), "http://example.test");
    }

    #[test]
    fn success_range_is_2xx() {
        let ok = UpstreamResponse {
            status: 204,
            body: String::new(),
        };
        let err = UpstreamResponse {
            status: 404,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!err.is_success());
    }
}
