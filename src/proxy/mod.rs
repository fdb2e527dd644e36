//! The fetch-through proxy core.
//!
//! [`FetchThrough`] orchestrates the cache-aside sequence (fingerprint,
//! lookup, serve-or-evict, upstream fetch, populate) over the seams it is
//! built from: a [`CacheStore`](crate::CacheStore), an
//! [`UpstreamClient`](crate::UpstreamClient), and a resolved
//! [`EndpointDescriptor`](crate::EndpointDescriptor) per request. All
//! collaborators are injected through [`MuninnBuilder`]; there is no global
//! state.

mod builder;
mod engine;
mod singleflight;

pub use builder::{Muninn, MuninnBuilder};
pub use engine::{ErrorPolicy, FetchThrough};
