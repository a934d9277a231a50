//! Accelerator driver backed by an in-process Moka segment

use async_trait::async_trait;
use cachette_config::{AcceleratorOptions, CacheOptions};
use moka::future::Cache as MokaInner;
use moka::Expiry;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{cache::CacheDriver, pattern::PatternSpec, CacheError, CacheResult};

/// Stored value with its own time-to-live
#[derive(Debug, Clone)]
struct Slot {
    payload: Arc<[u8]>,
    ttl: Option<Duration>,
}

impl Slot {
    fn new(payload: &[u8], ttl: Duration) -> Self {
        Self {
            payload: Arc::from(payload),
            // A zero TTL never expires
            ttl: (!ttl.is_zero()).then_some(ttl),
        }
    }
}

/// Expiry policy reading the TTL carried by each slot
struct PerEntryTtl;

impl Expiry<String, Slot> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Slot, _created_at: Instant) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Slot,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// A shared-memory style segment that accelerator drivers store into
///
/// Clones share the same entries. The process-wide segment returned by
/// [`AcceleratorSegment::shared`] is what drivers use by default, so a flush
/// through any accelerator driver clears it for all of them.
#[derive(Clone)]
pub struct AcceleratorSegment {
    inner: MokaInner<String, Slot>,
}

static SHARED_SEGMENT: OnceCell<AcceleratorSegment> = OnceCell::new();

impl AcceleratorSegment {
    /// Create a private segment
    pub fn new(options: &AcceleratorOptions) -> Self {
        let mut builder = MokaInner::builder().expire_after(PerEntryTtl);

        if let Some(capacity) = options.max_capacity {
            builder = builder.max_capacity(capacity);
        }

        Self {
            inner: builder.build(),
        }
    }

    /// The process-wide segment, created with the options of its first user
    pub fn shared(options: &AcceleratorOptions) -> Self {
        SHARED_SEGMENT
            .get_or_init(|| {
                log::debug!("Creating process-wide accelerator segment");
                Self::new(options)
            })
            .clone()
    }

    /// Approximate number of entries, including ones pending eviction
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Run pending eviction and expiration housekeeping
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

/// Accelerator cache driver
///
/// There is no connection step: every operation is a direct call into the
/// segment. `add` is atomic through the segment's entry API.
#[derive(Clone)]
pub struct AcceleratorCache {
    segment: AcceleratorSegment,
}

impl AcceleratorCache {
    /// Create a driver over the process-wide segment
    pub fn new(options: &CacheOptions) -> CacheResult<Self> {
        Ok(Self::with_segment(AcceleratorSegment::shared(
            &options.accelerator,
        )))
    }

    /// Create a driver over a specific segment
    pub fn with_segment(segment: AcceleratorSegment) -> Self {
        Self { segment }
    }

    pub fn segment(&self) -> &AcceleratorSegment {
        &self.segment
    }
}

#[async_trait]
impl CacheDriver for AcceleratorCache {
    fn name(&self) -> &'static str {
        "accelerator"
    }

    async fn add(&self, key: &str, payload: &[u8], ttl: Duration) -> CacheResult<()> {
        let entry = self
            .segment
            .inner
            .entry_by_ref(key)
            .or_insert(Slot::new(payload, ttl))
            .await;

        if entry.is_fresh() {
            Ok(())
        } else {
            Err(CacheError::exists(key))
        }
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.segment.inner.contains_key(key))
    }

    async fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self
            .segment
            .inner
            .get(key)
            .await
            .map(|slot| slot.payload.to_vec()))
    }

    async fn flush(&self, pattern: Option<&PatternSpec>) -> CacheResult<()> {
        if pattern.is_some() {
            return Err(CacheError::unsupported(
                "The accelerator backend does not support flushing partial keys",
            ));
        }

        log::debug!("Flushing accelerator segment");
        self.segment.inner.invalidate_all();
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        // Removing an absent key is a failure for this backend, and an
        // expired entry that has not been evicted yet counts as absent
        if !self.segment.inner.contains_key(key) {
            self.segment.inner.invalidate(key).await;
            return Err(CacheError::delete(key, "no such entry"));
        }

        match self.segment.inner.remove(key).await {
            Some(_) => Ok(()),
            None => Err(CacheError::delete(key, "no such entry")),
        }
    }

    async fn set(&self, key: &str, payload: &[u8], ttl: Duration) -> CacheResult<()> {
        self.segment
            .inner
            .insert(key.to_string(), Slot::new(payload, ttl))
            .await;
        Ok(())
    }
}
