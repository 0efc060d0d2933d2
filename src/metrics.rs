//! Operation counters for the cache (feature `metrics`).
//!
//! Counters use relaxed atomics so the read path can record hits and misses
//! through a shared reference; totals are exact under external
//! synchronization and monotone without it. [`SieveMetricsSnapshot`] is a
//! plain-data copy suitable for logging or assertions.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live operation counters attached to a cache.
#[derive(Debug, Default)]
pub struct SieveMetrics {
    get_hits: AtomicU64,
    get_misses: AtomicU64,
    inserts_new: AtomicU64,
    inserts_updated: AtomicU64,
    evictions: AtomicU64,
    removes: AtomicU64,
    clears: AtomicU64,
}

impl SieveMetrics {
    pub fn record_get_hit(&self) {
        self.get_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_get_miss(&self) {
        self.get_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insert_new(&self) {
        self.inserts_new.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insert_update(&self) {
        self.inserts_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counters out; `cache_len` and `capacity` are supplied by
    /// the owning cache.
    pub fn snapshot(&self, cache_len: usize, capacity: usize) -> SieveMetricsSnapshot {
        SieveMetricsSnapshot {
            get_hits: self.get_hits.load(Ordering::Relaxed),
            get_misses: self.get_misses.load(Ordering::Relaxed),
            inserts_new: self.inserts_new.load(Ordering::Relaxed),
            inserts_updated: self.inserts_updated.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            cache_len,
            capacity,
        }
    }
}

/// Point-in-time copy of a cache's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SieveMetricsSnapshot {
    pub get_hits: u64,
    pub get_misses: u64,
    pub inserts_new: u64,
    pub inserts_updated: u64,
    pub evictions: u64,
    pub removes: u64,
    pub clears: u64,
    pub cache_len: usize,
    pub capacity: usize,
}

impl SieveMetricsSnapshot {
    /// Hit fraction over all gets, or `None` before the first get.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.get_hits + self.get_misses;
        if total == 0 {
            None
        } else {
            Some(self.get_hits as f64 / total as f64)
        }
    }
}

/// Types that can expose a metrics snapshot.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
