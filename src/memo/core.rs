//! Unlocked single-store memo: the template the public variants build on.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::error::MemoError;
use crate::memo;
use crate::stats::{StatsSnapshot, StoreStats};
use crate::store::LruStore;

/// Unlocked memoizing LRU cache over a producer function.
///
/// This is the single-store template shared by the whole topology family:
/// [`SingleMemo`](crate::memo::SingleMemo) is this plus one coarse mutex,
/// and the composite variants shard over stores running exactly this
/// algorithm. On its own it serves single-threaded callers and is the
/// correctness baseline for the rest of the family, which is why `get`
/// takes `&mut self` and never blocks.
///
/// Unlike the locked variants, the producer may recurse into this cache
/// (compute one key in terms of another) without deadlocking, as long as
/// the borrow checker lets the call through (`&mut` makes true reentrancy
/// a compile error rather than a runtime hang).
///
/// # Example
///
/// ```
/// use memoring::memo::MemoCore;
///
/// let mut cache = MemoCore::new(|k: &u64| k * k, 3).unwrap();
///
/// assert_eq!(*cache.get(4), 16);  // miss: producer runs
/// assert_eq!(*cache.get(4), 16);  // hit: producer skipped
/// assert_eq!(cache.hits(), 1);
/// assert_eq!(cache.misses(), 1);
/// ```
pub struct MemoCore<K, V, P> {
    store: LruStore<K, V>,
    stats: StoreStats,
    producer: P,
}

impl<K, V, P> MemoCore<K, V, P>
where
    K: Copy + Eq + Hash,
    P: Fn(&K) -> V,
{
    /// Creates a cache memoizing `producer` under a budget of `capacity`
    /// entries.
    ///
    /// Rejects a zero capacity: a cache that can hold nothing cannot honor
    /// the recency contract.
    pub fn new(producer: P, capacity: usize) -> Result<Self, MemoError> {
        if capacity == 0 {
            return Err(MemoError::config("cache capacity must be > 0"));
        }
        Ok(Self {
            store: LruStore::new(capacity),
            stats: StoreStats::new(),
            producer,
        })
    }

    /// Returns the memoized value for `key`, invoking the producer on a
    /// miss.
    ///
    /// A producer panic propagates to the caller; nothing is recorded or
    /// inserted in that case.
    pub fn get(&mut self, key: K) -> Arc<V> {
        memo::lookup(&mut self.store, &self.stats, &self.producer, key)
    }

    /// Returns memoized values for `keys`, in order, one [`get`](Self::get)
    /// each.
    pub fn get_many(&mut self, keys: &[K]) -> Vec<Arc<V>> {
        keys.iter().map(|&key| self.get(key)).collect()
    }

    /// Lookups answered from the store.
    pub fn hits(&self) -> u64 {
        self.stats.hits()
    }

    /// Lookups that invoked the producer.
    pub fn misses(&self) -> u64 {
        self.stats.misses()
    }

    /// Total lookups; always `hits + misses`.
    pub fn lookups(&self) -> u64 {
        self.stats.hits() + self.stats.misses()
    }

    /// Entry budget.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Total wall-clock time spent inside `get`, producer time included.
    pub fn total_lookup_time(&self) -> Duration {
        Duration::from_nanos(self.stats.lookup_nanos())
    }

    /// Current counters as a snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.store.capacity())
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns `true` if `key` is resident, without touching recency or
    /// counters.
    pub fn contains(&self, key: &K) -> bool {
        self.store.contains(key)
    }
}

impl<K, V, P> fmt::Debug for MemoCore<K, V, P>
where
    K: Copy + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCore")
            .field("len", &self.store.len())
            .field("capacity", &self.store.capacity())
            .finish_non_exhaustive()
    }
}

impl<K, V, P> fmt::Display for MemoCore<K, V, P>
where
    K: Copy + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.stats(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn zero_capacity_is_rejected() {
        let result = MemoCore::new(|k: &u64| *k, 0);
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn producer_runs_once_per_distinct_key_within_budget() {
        let calls = Cell::new(0u32);
        let mut cache = MemoCore::new(
            |k: &u64| {
                calls.set(calls.get() + 1);
                k * 2
            },
            8,
        )
        .unwrap();

        for _ in 0..5 {
            for key in 0..8u64 {
                assert_eq!(*cache.get(key), key * 2);
            }
        }
        assert_eq!(calls.get(), 8);
        assert_eq!(cache.misses(), 8);
        assert_eq!(cache.hits(), 32);
    }

    #[test]
    fn evicted_key_recomputes_and_recency_protects_survivors() {
        let calls = Cell::new(0u32);
        let mut cache = MemoCore::new(
            |k: &u64| {
                calls.set(calls.get() + 1);
                *k
            },
            3,
        )
        .unwrap();

        // Fill 0..3, then insert 3: key 0 is the victim.
        for key in 0..4u64 {
            cache.get(key);
        }
        assert_eq!(calls.get(), 4);

        // 0 recomputes; 1..=3 are still resident.
        cache.get(0);
        assert_eq!(calls.get(), 5);
        let before = calls.get();
        cache.get(2);
        cache.get(3);
        assert_eq!(calls.get(), before);
    }

    #[test]
    fn squares_sequence_hit_miss_accounting() {
        let mut cache = MemoCore::new(|k: &u64| k * k, 3).unwrap();
        let results: Vec<u64> = [1u64, 2, 3, 1, 4, 2]
            .iter()
            .map(|&k| *cache.get(k))
            .collect();

        assert_eq!(results, vec![1, 4, 9, 1, 16, 4]);
        assert_eq!(cache.misses(), 5);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.lookups(), 6);
    }

    #[test]
    fn identity_sequence_with_tiny_budget_never_hits() {
        let mut cache = MemoCore::new(|k: &u64| *k, 2).unwrap();
        let results = cache.get_many(&[1, 2, 3, 1]);
        let values: Vec<u64> = results.iter().map(|v| **v).collect();

        assert_eq!(values, vec![1, 2, 3, 1]);
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.misses(), 4);
    }

    #[test]
    fn get_many_preserves_order_and_multiplicity() {
        let mut cache = MemoCore::new(|k: &u64| k + 100, 4).unwrap();
        let results = cache.get_many(&[3, 3, 1, 3]);
        let values: Vec<u64> = results.iter().map(|v| **v).collect();
        assert_eq!(values, vec![103, 103, 101, 103]);
        assert_eq!(cache.lookups(), 4);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn stat_reads_are_idempotent() {
        let mut cache = MemoCore::new(|k: &u64| *k, 2).unwrap();
        cache.get(1);
        let (h, m) = (cache.hits(), cache.misses());
        for _ in 0..10 {
            let _ = cache.hits();
            let _ = cache.misses();
            let _ = cache.lookups();
            let _ = cache.stats();
        }
        assert_eq!((cache.hits(), cache.misses()), (h, m));
    }

    #[test]
    fn lookup_time_accumulates() {
        let mut cache = MemoCore::new(
            |k: &u64| {
                std::thread::sleep(std::time::Duration::from_millis(2));
                *k
            },
            2,
        )
        .unwrap();
        cache.get(1);
        assert!(cache.total_lookup_time() >= Duration::from_millis(2));
    }

    #[test]
    fn summary_renders_the_reporting_line() {
        let mut cache = MemoCore::new(|k: &u64| *k, 4).unwrap();
        cache.get(1);
        cache.get(1);
        assert_eq!(
            cache.to_string(),
            "Cache [ capacity: 4, hits: 1, misses: 1, hit rate: 0.5 ]"
        );
    }
}
