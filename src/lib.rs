//! Muninn: caching fetch-through proxy for read-only XML APIs
//!
//! Muninn sits in front of a third-party read-only API, fingerprints each
//! request's declared parameters, serves a stored response while it is still
//! fresh, and otherwise fetches upstream, populates the cache, and returns
//! the fresh payload. It is a pass-through cache, not an API client library:
//! payloads are stored and served as opaque text (typically XML) with a
//! single-character sanitation pass at write time.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//!
//! use muninn::{Muninn, registry::preset};
//!
//! #[tokio::main]
//! async fn main() -> muninn::Result<()> {
//!     let engine = Muninn::builder()
//!         .upstream_root(preset::DEFAULT_UPSTREAM_ROOT)
//!         .build()?;
//!
//!     let registry = muninn::EndpointRegistry::from_descriptors(preset::eve_api())?;
//!     let descriptor = registry
//!         .resolve("/eve/SkillTree.xml.aspx")
//!         .expect("preset endpoint");
//!
//!     let payload = engine.handle(&descriptor, &HashMap::new()).await?;
//!     println!("{payload}");
//!     Ok(())
//! }
//! ```
//!
//! # Daemon
//!
//! The `server` feature adds an axum HTTP front end and the `muninnd`
//! binary, which dispatch inbound paths to registered endpoints and reply
//! with a fixed `application/xml;charset=UTF-8` content type.

pub mod error;
pub mod fingerprint;
pub mod freshness;
pub mod proxy;
pub mod registry;
#[cfg(feature = "server")]
pub mod server;
pub mod store;
pub mod telemetry;
pub mod upstream;

// Re-export main types at crate root
pub use error::{MuninnError, Result};
pub use proxy::{ErrorPolicy, FetchThrough, Muninn, MuninnBuilder};
pub use registry::{EndpointDescriptor, EndpointRegistry, EndpointSpec};
pub use store::{CacheEntry, CacheStore, MemoryStore};
pub use upstream::{HttpUpstreamClient, UpstreamClient, UpstreamResponse};
