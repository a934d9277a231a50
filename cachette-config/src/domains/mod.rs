//! Backend-specific option domains

pub mod accelerator;
pub mod distributed;
pub mod document;
pub mod utils;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which backend a cache handle drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process accelerator segment
    #[serde(alias = "apc", alias = "memory")]
    Accelerator,

    /// Pool of distributed key-value servers
    #[serde(alias = "memcached", alias = "redis")]
    Distributed,

    /// Document database collection
    #[serde(alias = "mongo", alias = "mongodb")]
    Document,

    /// Caching disabled
    #[serde(alias = "null", alias = "noop")]
    None,
}

impl Default for BackendKind {
    fn default() -> Self {
        Self::Accelerator
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Accelerator => write!(f, "accelerator"),
            BackendKind::Distributed => write!(f, "distributed"),
            BackendKind::Document => write!(f, "document"),
            BackendKind::None => write!(f, "none"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accelerator" | "apc" | "memory" => Ok(BackendKind::Accelerator),
            "distributed" | "memcached" | "redis" => Ok(BackendKind::Distributed),
            "document" | "mongo" | "mongodb" => Ok(BackendKind::Document),
            "none" | "null" | "noop" => Ok(BackendKind::None),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Options read by a cache driver at connect time
///
/// Drivers clone the options they need when they are constructed, so anything
/// that affects connection topology is frozen for the lifetime of a driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Backend selected by the driver factory
    pub backend: BackendKind,

    /// Default time-to-live used by `store`
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_ttl")]
    pub ttl: Duration,

    /// Mirror stored payloads into the runtime tier
    #[serde(default = "crate::domains::utils::default_false")]
    pub runtime: bool,

    /// Accelerator backend options
    pub accelerator: accelerator::AcceleratorOptions,

    /// Distributed backend options
    #[serde(alias = "memcache")]
    pub distributed: distributed::DistributedOptions,

    /// Document backend options
    #[serde(alias = "mongo")]
    pub document: document::DocumentOptions,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            ttl: default_ttl(),
            runtime: false,
            accelerator: accelerator::AcceleratorOptions::default(),
            distributed: distributed::DistributedOptions::default(),
            document: document::DocumentOptions::default(),
        }
    }
}

impl CacheOptions {
    /// Options for the given backend with every other key at its default
    pub fn for_backend(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Default::default()
        }
    }

    /// Set the default time-to-live
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable runtime tier mirroring
    pub fn with_runtime(mut self, runtime: bool) -> Self {
        self.runtime = runtime;
        self
    }
}

fn default_ttl() -> Duration {
    Duration::from_secs(900) // 15 minutes
}
