//! Muninn error types

/// Muninn error types
#[derive(Debug, thiserror::Error)]
pub enum MuninnError {
    // Upstream/network errors
    /// The upstream call failed at the transport level (unreachable host,
    /// connection reset, timeout). No response bytes arrived, so there is
    /// nothing to cache regardless of the error policy.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The upstream answered with a non-success status and the engine is
    /// configured to surface rather than cache error bodies.
    #[error("upstream returned status {status}")]
    UpstreamStatus { status: u16 },

    // Storage errors
    #[error("storage error: {0}")]
    Storage(String),

    // Routing errors
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for Muninn operations
pub type Result<T> = std::result::Result<T, MuninnError>;
