//! Endpoint registry: the static table of proxied remote operations.
//!
//! Each [`EndpointDescriptor`] names one remote read operation: the inbound
//! path (which doubles as the upstream path segment), the ordered list of
//! declared parameters, and the cache TTL. The registry resolves an inbound
//! request path to its descriptor; the fetch-through engine never sees raw
//! paths, only resolved descriptors.
//!
//! Descriptors are data, not code: the built-in table lives in [`preset`],
//! and additional endpoints deserialize from `[[endpoints]]` TOML tables via
//! [`EndpointSpec`].

pub mod preset;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::{MuninnError, Result};

/// One named remote read operation with a fixed parameter schema and TTL.
///
/// Immutable, defined at startup. `name` is both the inbound request path
/// and the upstream path segment (e.g. `/eve/SkillTree.xml.aspx`).
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    /// Unique identifier; the inbound path and upstream path segment.
    pub name: String,
    /// Declared parameters, in fingerprint order. May be empty.
    pub parameter_names: Vec<String>,
    /// Time-to-live for cached responses. Strictly positive.
    pub ttl: Duration,
}

impl EndpointDescriptor {
    /// Construct a descriptor from borrowed parts.
    pub fn new(name: impl Into<String>, parameter_names: &[&str], ttl: Duration) -> Self {
        Self {
            name: name.into(),
            parameter_names: parameter_names.iter().map(|s| s.to_string()).collect(),
            ttl,
        }
    }
}

/// TOML-facing endpoint definition (one `[[endpoints]]` table).
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSpec {
    /// Inbound path, e.g. `/eve/SkillTree.xml.aspx`.
    pub path: String,
    /// Declared parameters in fingerprint order.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Cache TTL in seconds. Must be positive.
    pub ttl_secs: u64,
}

impl TryFrom<EndpointSpec> for EndpointDescriptor {
    type Error = MuninnError;

    fn try_from(spec: EndpointSpec) -> Result<Self> {
        if spec.ttl_secs == 0 {
            return Err(MuninnError::Configuration(format!(
                "endpoint {} has a zero ttl",
                spec.path
            )));
        }
        if !spec.path.starts_with('/') {
            return Err(MuninnError::Configuration(format!(
                "endpoint path {} must start with '/'",
                spec.path
            )));
        }
        Ok(EndpointDescriptor {
            name: spec.path,
            parameter_names: spec.parameters,
            ttl: Duration::from_secs(spec.ttl_secs),
        })
    }
}

/// Path → descriptor table. Exact-match resolution.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<String, Arc<EndpointDescriptor>>,
}

impl EndpointRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from descriptors, rejecting duplicate paths.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = EndpointDescriptor>,
    {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.insert(descriptor)?;
        }
        Ok(registry)
    }

    /// Register a descriptor. Duplicate paths are a configuration error.
    pub fn insert(&mut self, descriptor: EndpointDescriptor) -> Result<()> {
        if self.endpoints.contains_key(&descriptor.name) {
            return Err(MuninnError::Configuration(format!(
                "duplicate endpoint path: {}",
                descriptor.name
            )));
        }
        self.endpoints
            .insert(descriptor.name.clone(), Arc::new(descriptor));
        Ok(())
    }

    /// Whether a descriptor is registered for `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.endpoints.contains_key(path)
    }

    /// Resolve an inbound path to its descriptor. Exact match only.
    pub fn resolve(&self, path: &str) -> Option<Arc<EndpointDescriptor>> {
        self.endpoints.get(path).cloned()
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
