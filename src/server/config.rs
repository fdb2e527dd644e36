//! Configuration loading for muninnd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.muninn/config.toml` (user)
//! 3. `/etc/muninn/config.toml` (system)
//!
//! Every field has a default, and the built-in endpoint preset is on by
//! default, so the daemon runs with no config file at all.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::proxy::{ErrorPolicy, FetchThrough, Muninn};
use crate::registry::{EndpointRegistry, EndpointSpec, preset};
use crate::upstream;
use crate::{MuninnError, Result};

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CachePolicyConfig,
    /// Extra endpoints; these take precedence over preset entries with the
    /// same path.
    #[serde(default)]
    pub endpoints: Vec<EndpointSpec>,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:9742).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:9742".to_string()
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Upstream root URL (default: the preset API root).
    #[serde(default = "default_root")]
    pub root: String,
    /// Upstream call timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// One bounded retry on transient upstream errors (default: false).
    #[serde(default)]
    pub retry_transient: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            timeout_secs: default_timeout(),
            retry_transient: false,
        }
    }
}

fn default_root() -> String {
    preset::DEFAULT_UPSTREAM_ROOT.to_string()
}

fn default_timeout() -> u64 {
    upstream::DEFAULT_TIMEOUT.as_secs()
}

/// Cache behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CachePolicyConfig {
    /// Surface non-2xx upstream responses instead of caching their bodies
    /// (default: false).
    #[serde(default)]
    pub surface_upstream_errors: bool,
    /// Coalesce concurrent misses per cache key into one upstream call
    /// (default: false).
    #[serde(default)]
    pub single_flight: bool,
    /// Register the built-in endpoint table (default: true).
    #[serde(default = "default_true")]
    pub use_preset: bool,
}

impl Default for CachePolicyConfig {
    fn default() -> Self {
        Self {
            surface_upstream_errors: false,
            single_flight: false,
            use_preset: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; missing is an error)
    /// 2. `~/.muninn/config.toml`
    /// 3. `/etc/muninn/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|e| {
                    MuninnError::Configuration(format!("failed to read config file {path:?}: {e}"))
                })?;
                toml::from_str(&content).map_err(|e| {
                    MuninnError::Configuration(format!("failed to parse config file {path:?}: {e}"))
                })
            }
            None => {
                info!("no config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(MuninnError::Configuration(format!(
                "config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".muninn").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/muninn/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Build the endpoint registry: configured endpoints first, then the
    /// preset table minus any path the configuration overrode.
    pub fn build_registry(&self) -> Result<EndpointRegistry> {
        let mut registry = EndpointRegistry::new();
        for spec in &self.endpoints {
            registry.insert(spec.clone().try_into()?)?;
        }
        if self.cache.use_preset {
            for descriptor in preset::eve_api() {
                if !registry.contains(&descriptor.name) {
                    registry.insert(descriptor)?;
                }
            }
        }
        Ok(registry)
    }

    /// Build the fetch-through engine from this configuration.
    pub fn build_engine(&self) -> Result<FetchThrough> {
        let mut builder = Muninn::builder()
            .upstream_root(&self.upstream.root)
            .upstream_timeout(Duration::from_secs(self.upstream.timeout_secs))
            .retry_transient(self.upstream.retry_transient)
            .single_flight(self.cache.single_flight);
        if self.cache.surface_upstream_errors {
            builder = builder.error_policy(ErrorPolicy::SurfaceErrors);
        }
        builder.build()
    }
}
