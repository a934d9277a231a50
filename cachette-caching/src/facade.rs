//! Cache facade composing a driver with the runtime tier

use cachette_config::CacheOptions;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{
    cache::CacheDriver,
    create_driver,
    pattern::PatternSpec,
    runtime::RuntimeTier,
    stats::{create_stats_collector, SharedStatsCollector},
    CacheResult, CacheStats,
};

/// Public entry point for caching opaque payloads
///
/// Every operation goes straight to the driver and returns its error kind
/// unchanged. `store` adds add-or-overwrite semantics on top of the driver's
/// `add` and `set`, and mirrors what it wrote into the runtime tier when the
/// `runtime` option is on.
pub struct Cache {
    driver: Arc<dyn CacheDriver>,
    ttl: Duration,
    mirror_runtime: bool,
    runtime: RuntimeTier,
    stats: SharedStatsCollector,
}

impl Cache {
    /// Create a facade over an existing driver
    pub fn new(driver: Arc<dyn CacheDriver>, options: &CacheOptions, runtime: RuntimeTier) -> Self {
        Self {
            driver,
            ttl: options.ttl,
            mirror_runtime: options.runtime,
            runtime,
            stats: create_stats_collector(),
        }
    }

    /// Create a facade over the driver selected by `options.backend`
    pub fn from_options(options: &CacheOptions, runtime: RuntimeTier) -> CacheResult<Self> {
        Ok(Self::new(create_driver(options)?, options, runtime))
    }

    /// Name of the active backend
    pub fn backend(&self) -> &'static str {
        self.driver.name()
    }

    /// TTL used by `store`
    pub fn default_ttl(&self) -> Duration {
        self.ttl
    }

    pub fn runtime(&self) -> &RuntimeTier {
        &self.runtime
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.get_stats()
    }

    /// Store a payload under the default TTL, overwriting any existing entry
    pub async fn store(&self, key: &str, payload: &[u8]) -> CacheResult<()> {
        let present = self
            .observe(self.driver.exists_including_expired(key).await)?;

        let result = if present {
            self.driver.set(key, payload, self.ttl).await
        } else {
            self.driver.add(key, payload, self.ttl).await
        };
        self.observe(result)?;
        self.stats.record_write();

        if self.mirror_runtime {
            self.runtime.insert(key, payload.to_vec());
        }

        Ok(())
    }

    /// Insert a payload only if no live entry exists for the key
    pub async fn add(&self, key: &str, payload: &[u8], ttl: Duration) -> CacheResult<()> {
        self.observe(self.driver.add(key, payload, ttl).await)?;
        self.stats.record_write();
        Ok(())
    }

    /// Create or overwrite the entry for a key
    pub async fn set(&self, key: &str, payload: &[u8], ttl: Duration) -> CacheResult<()> {
        self.observe(self.driver.set(key, payload, ttl).await)?;
        self.stats.record_write();
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.observe(self.driver.exists(key).await)
    }

    /// Get the payload for a key; a miss is `Ok(None)`
    pub async fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let start = Instant::now();
        let payload = self.observe(self.driver.fetch(key).await)?;

        if payload.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        self.stats
            .record_fetch_latency(start.elapsed().as_nanos() as u64);

        Ok(payload)
    }

    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        self.observe(self.driver.delete(key).await)?;
        self.stats.record_delete();
        Ok(())
    }

    /// Remove every entry, or only the entries whose keys match `pattern`
    pub async fn flush(&self, pattern: Option<&PatternSpec>) -> CacheResult<()> {
        self.observe(self.driver.flush(pattern).await)?;
        self.stats.record_flush();
        Ok(())
    }

    fn observe<T>(&self, result: CacheResult<T>) -> CacheResult<T> {
        if let Err(e) = &result {
            self.stats.record_failure();
            log::warn!("{} cache operation failed: {}", self.driver.name(), e);
        }
        result
    }
}
