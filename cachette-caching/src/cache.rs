//! Core driver trait

use async_trait::async_trait;
use std::time::Duration;

use crate::{pattern::PatternSpec, CacheResult};

/// The storage contract every backend implements
///
/// Payloads are opaque bytes. `ttl` is relative to the time of the call; how
/// a zero TTL is treated is backend specific (the accelerator and distributed
/// backends treat it as "never expires", the document backend as "already
/// expired").
#[async_trait]
pub trait CacheDriver: Send + Sync {
    /// Short backend name used in logs and errors
    fn name(&self) -> &'static str;

    /// Insert an entry only if no live entry exists for the key
    ///
    /// Fails with `EntryExists` when the key is taken.
    async fn add(&self, key: &str, payload: &[u8], ttl: Duration) -> CacheResult<()>;

    /// Check whether a live entry exists for the key
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Check for an entry, counting expired entries that are still stored
    ///
    /// Backends with native expiry never keep expired entries around, so the
    /// default is the same as `exists`.
    async fn exists_including_expired(&self, key: &str) -> CacheResult<bool> {
        self.exists(key).await
    }

    /// Get the payload of a live entry, `None` on a miss
    async fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Remove every entry, or only the entries whose keys match `pattern`
    async fn flush(&self, pattern: Option<&PatternSpec>) -> CacheResult<()>;

    /// Remove the entry for a key
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Create or overwrite the entry for a key
    async fn set(&self, key: &str, payload: &[u8], ttl: Duration) -> CacheResult<()>;
}
