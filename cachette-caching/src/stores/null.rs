//! Null driver: caching disabled

use async_trait::async_trait;
use std::time::Duration;

use crate::{cache::CacheDriver, pattern::PatternSpec, CacheResult};

/// Driver that stores nothing
///
/// Every operation succeeds and every lookup misses, so caching can be
/// switched off without touching call sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

#[async_trait]
impl CacheDriver for NullCache {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn add(&self, _key: &str, _payload: &[u8], _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        Ok(false)
    }

    async fn fetch(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn flush(&self, _pattern: Option<&PatternSpec>) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn set(&self, _key: &str, _payload: &[u8], _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache() {
        let cache = NullCache;
        let ttl = Duration::from_secs(60);

        cache.add("key", b"value", ttl).await.unwrap();
        cache.add("key", b"value", ttl).await.unwrap();
        cache.set("key", b"value", ttl).await.unwrap();
        assert!(!cache.exists("key").await.unwrap());
        assert_eq!(cache.fetch("key").await.unwrap(), None);

        cache.delete("key").await.unwrap();
        cache.delete("key").await.unwrap();
        cache.flush(None).await.unwrap();
        cache
            .flush(Some(&PatternSpec::prefix("user:")))
            .await
            .unwrap();
    }
}
