//! Lookup statistics: recording, snapshotting, and rendering.
//!
//! This module mirrors the split used across the rest of the library:
//! *recording* ([`StoreStats`], one per store, relaxed atomic counters that
//! the lookup path increments) is separated from *consumption*
//! ([`StatsSnapshot`], a plain value the caller reads, aggregates, renders).
//!
//! ## Architecture
//!
//! ```text
//!   lookup path (per store)                read side (any thread)
//!   ┌──────────────────────────┐           ┌──────────────────────────┐
//!   │ StoreStats               │           │ StatsSnapshot            │
//!   │   hits:   AtomicU64  ────┼──────────►│   hits, misses           │
//!   │   misses: AtomicU64      │  snapshot │   capacity               │
//!   │   lookup_nanos: AtomicU64│           │   lookup_time            │
//!   └──────────────────────────┘           │   lookups(), hit_rate()  │
//!            ▲                             └───────────┬──────────────┘
//!            │ LookupTimer (scoped)                    │ Display / render
//!            └ accumulates elapsed on drop             ▼
//!                                  "Cache [ capacity: C, hits: H, ... ]"
//! ```
//!
//! Counters use relaxed atomics: each counter is individually torn-free, but
//! the tuple `(hits, misses)` read during a concurrent burst is a best-effort
//! snapshot, not a consistent cut. Reading statistics never touches a store
//! and never takes a lock.
//!
//! The lookup timer is a scoped guard so that every exit path of a lookup
//! (hit, miss, or a producer panic unwinding through the cache) contributes
//! its elapsed time.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Per-store lookup counters, updated by the lookup path.
#[derive(Debug, Default)]
pub struct StoreStats {
    hits: AtomicU64,
    misses: AtomicU64,
    lookup_nanos: AtomicU64,
}

impl StoreStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup that found its entry in the store.
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a lookup that had to invoke the producer.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the hit count.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the miss count.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Returns the accumulated lookup time in nanoseconds.
    #[inline]
    pub fn lookup_nanos(&self) -> u64 {
        self.lookup_nanos.load(Ordering::Relaxed)
    }

    /// Starts a scoped timer whose elapsed time is added to this store's
    /// total when the guard drops.
    #[inline]
    pub fn lookup_timer(&self) -> LookupTimer<'_> {
        LookupTimer {
            stats: self,
            started: Instant::now(),
        }
    }

    /// Captures these counters into a snapshot, stamping in the store's
    /// capacity.
    pub fn snapshot(&self, capacity: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            capacity,
            lookup_time: Duration::from_nanos(self.lookup_nanos()),
        }
    }
}

/// Scoped lookup timer; adds its elapsed time to the owning [`StoreStats`]
/// when dropped.
#[derive(Debug)]
pub struct LookupTimer<'a> {
    stats: &'a StoreStats,
    started: Instant,
}

impl Drop for LookupTimer<'_> {
    fn drop(&mut self) {
        let nanos = self.started.elapsed().as_nanos() as u64;
        self.stats.lookup_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

/// Point-in-time view of a cache's lookup counters.
///
/// For composite caches this is the sum over all constituent stores; see
/// [`merge`](StatsSnapshot::merge).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Lookups answered from a store.
    pub hits: u64,
    /// Lookups that invoked the producer.
    pub misses: u64,
    /// Entry budget of the cache (aggregate for composites).
    pub capacity: usize,
    /// Total wall-clock time spent inside `get`, producer time included.
    pub lookup_time: Duration,
}

impl StatsSnapshot {
    /// Total lookups; always `hits + misses`.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of lookups answered without invoking the producer.
    ///
    /// Computed with floating-point division even when no lookups have
    /// happened, so `0/0` yields `NaN`; the rendered summary keeps the same
    /// shape either way.
    pub fn hit_rate(&self) -> f64 {
        self.hits as f64 / (self.hits + self.misses) as f64
    }

    /// Sums another store's counters into this snapshot. Capacities add up
    /// too: a composite's capacity is the sum of its shards'.
    pub fn merge(&mut self, other: &StatsSnapshot) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.capacity += other.capacity;
        self.lookup_time += other.lookup_time;
    }

    /// Writes the one-line summary to `out`.
    ///
    /// This is the reporting hook used by the surrounding pipeline's bench
    /// harness; the format matches [`Display`](fmt::Display).
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cache [ capacity: {}, hits: {}, misses: {}, hit rate: {} ]",
            self.capacity,
            self.hits,
            self.misses,
            self.hit_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = StoreStats::new();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.misses(), 0);
        assert_eq!(stats.lookup_nanos(), 0);
    }

    #[test]
    fn record_hit_and_miss_are_independent() {
        let stats = StoreStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hits(), 2);
        assert_eq!(stats.misses(), 1);
    }

    #[test]
    fn reading_counters_does_not_change_them() {
        let stats = StoreStats::new();
        stats.record_miss();
        for _ in 0..10 {
            let _ = stats.hits();
            let _ = stats.misses();
        }
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.misses(), 1);
    }

    #[test]
    fn lookup_timer_accumulates_on_drop() {
        let stats = StoreStats::new();
        {
            let _timer = stats.lookup_timer();
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(stats.lookup_nanos() > 0);
    }

    #[test]
    fn snapshot_captures_capacity_and_counters() {
        let stats = StoreStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_miss();

        let snap = stats.snapshot(64);
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 2);
        assert_eq!(snap.lookups(), 3);
        assert_eq!(snap.capacity, 64);
    }

    #[test]
    fn merge_sums_counters_and_capacity() {
        let mut a = StatsSnapshot {
            hits: 3,
            misses: 1,
            capacity: 8,
            lookup_time: Duration::from_nanos(100),
        };
        let b = StatsSnapshot {
            hits: 2,
            misses: 4,
            capacity: 8,
            lookup_time: Duration::from_nanos(50),
        };
        a.merge(&b);
        assert_eq!(a.hits, 5);
        assert_eq!(a.misses, 5);
        assert_eq!(a.lookups(), 10);
        assert_eq!(a.capacity, 16);
        assert_eq!(a.lookup_time, Duration::from_nanos(150));
    }

    #[test]
    fn summary_has_the_reporting_shape() {
        let snap = StatsSnapshot {
            hits: 3,
            misses: 1,
            capacity: 128,
            lookup_time: Duration::ZERO,
        };
        assert_eq!(
            snap.to_string(),
            "Cache [ capacity: 128, hits: 3, misses: 1, hit rate: 0.75 ]"
        );
    }

    #[test]
    fn summary_with_no_lookups_renders_nan_rate() {
        let snap = StatsSnapshot {
            capacity: 16,
            ..Default::default()
        };
        assert_eq!(
            snap.to_string(),
            "Cache [ capacity: 16, hits: 0, misses: 0, hit rate: NaN ]"
        );
    }

    #[test]
    fn render_writes_the_summary_line() {
        let snap = StatsSnapshot {
            hits: 1,
            misses: 1,
            capacity: 2,
            lookup_time: Duration::ZERO,
        };
        let mut out = Vec::new();
        snap.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Cache [ capacity: 2, hits: 1, misses: 1, hit rate: 0.5 ]\n"
        );
    }
}
