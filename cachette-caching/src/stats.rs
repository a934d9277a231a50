//! Cache statistics

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Snapshot of the operations a cache facade has seen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total number of fetches
    pub total_fetches: u64,

    /// Fetches that returned a payload
    pub hits: u64,

    /// Fetches that found nothing
    pub misses: u64,

    /// Successful add, set and store calls
    pub total_writes: u64,

    /// Successful deletes
    pub deletes: u64,

    /// Successful flushes
    pub flushes: u64,

    /// Operations that returned an error
    pub failures: u64,

    /// Hit rate (0.0 to 1.0)
    pub hit_rate: f64,

    /// Average fetch latency in microseconds
    pub avg_fetch_latency_us: Option<f64>,
}

/// Thread-safe statistics collector
#[derive(Debug, Default)]
pub struct StatsCollector {
    total_fetches: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    total_writes: AtomicU64,
    deletes: AtomicU64,
    flushes: AtomicU64,
    failures: AtomicU64,

    total_fetch_latency_ns: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.total_fetches.fetch_add(1, Ordering::Relaxed);
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.total_fetches.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.total_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_latency(&self, latency_ns: u64) {
        self.total_fetch_latency_ns
            .fetch_add(latency_ns, Ordering::Relaxed);
    }

    /// Get current stats
    pub fn get_stats(&self) -> CacheStats {
        let total_fetches = self.total_fetches.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);

        let hit_rate = if total_fetches > 0 {
            hits as f64 / total_fetches as f64
        } else {
            0.0
        };

        let avg_fetch_latency_us = if total_fetches > 0 {
            Some(
                self.total_fetch_latency_ns.load(Ordering::Relaxed) as f64
                    / total_fetches as f64
                    / 1000.0,
            )
        } else {
            None
        };

        CacheStats {
            total_fetches,
            hits,
            misses: self.misses.load(Ordering::Relaxed),
            total_writes: self.total_writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            hit_rate,
            avg_fetch_latency_us,
        }
    }
}

/// Shared stats collector
pub type SharedStatsCollector = Arc<StatsCollector>;

/// Create a new shared stats collector
pub fn create_stats_collector() -> SharedStatsCollector {
    Arc::new(StatsCollector::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = create_stats_collector();
        assert_eq!(stats.get_stats().hit_rate, 0.0);
        assert!(stats.get_stats().avg_fetch_latency_us.is_none());

        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_fetch_latency(4_000);

        let snapshot = stats.get_stats();
        assert_eq!(snapshot.total_fetches, 4);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.hit_rate, 0.75);
        assert_eq!(snapshot.avg_fetch_latency_us, Some(1.0));
    }
}
