//! One independent store per worker, no cross-worker sharing.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::MemoError;
use crate::memo::{self, Shard};
use crate::stats::StatsSnapshot;
use crate::traits::{MemoCache, WorkerId};

/// Memoizing LRU cache with one private store per worker.
///
/// Worker `i` routes every lookup to store `i`, so no two workers ever
/// contend; the per-store mutex exists only to satisfy the borrow checker
/// and is uncontended by construction as long as the caller upholds the
/// [`WorkerId`] stability contract. The price is duplication: two workers
/// asking for the same key each compute and store it independently, which
/// is only acceptable when the producer is deterministic.
///
/// A requested budget of C entries over N workers becomes N stores of
/// `C / N` entries each; the remainder is dropped and
/// [`capacity`](MemoCache::capacity) reports the truncated total.
///
/// # Panics
///
/// `get` panics if the worker index is out of range, which is a broken pool
/// mapping, not a cache condition.
///
/// # Example
///
/// ```
/// use memoring::memo::PerWorkerMemo;
/// use memoring::traits::{MemoCache, WorkerId};
///
/// let cache = PerWorkerMemo::new(|k: &u64| k + 1, 64, 4).unwrap();
///
/// // Both workers compute key 5; entries live in both stores.
/// assert_eq!(*cache.get(WorkerId::new(0), 5), 6);
/// assert_eq!(*cache.get(WorkerId::new(1), 5), 6);
/// assert_eq!(cache.misses(), 2);
/// ```
pub struct PerWorkerMemo<K, V, P> {
    stores: Vec<Shard<K, V>>,
    producer: P,
}

impl<K, V, P> PerWorkerMemo<K, V, P>
where
    K: Copy + Eq + Hash,
    P: Fn(&K) -> V,
{
    /// Creates `workers` independent stores of `capacity / workers` entries
    /// each.
    ///
    /// Rejects zero capacity, zero workers, and `capacity < workers` (the
    /// last would truncate to zero-capacity stores).
    pub fn new(producer: P, capacity: usize, workers: usize) -> Result<Self, MemoError> {
        let per_store = memo::validate_split(capacity, workers)?;
        Ok(Self {
            stores: (0..workers).map(|_| Shard::new(per_store)).collect(),
            producer,
        })
    }

    /// Number of worker stores.
    pub fn workers(&self) -> usize {
        self.stores.len()
    }
}

impl<K, V, P> MemoCache<K, V> for PerWorkerMemo<K, V, P>
where
    K: Copy + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn get(&self, worker: WorkerId, key: K) -> Arc<V> {
        let shard = &self.stores[worker.index()];
        let mut store = shard.store.lock();
        memo::lookup(&mut store, &shard.stats, &self.producer, key)
    }

    fn stats(&self) -> StatsSnapshot {
        memo::aggregate_stats(&self.stores)
    }
}

impl<K, V, P> fmt::Debug for PerWorkerMemo<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerWorkerMemo")
            .field("workers", &self.stores.len())
            .finish_non_exhaustive()
    }
}

impl<K, V, P> fmt::Display for PerWorkerMemo<K, V, P>
where
    K: Copy + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&MemoCache::stats(self), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn invalid_configurations_are_rejected() {
        assert!(PerWorkerMemo::new(|k: &u64| *k, 0, 2).is_err());
        assert!(PerWorkerMemo::new(|k: &u64| *k, 8, 0).is_err());
        assert!(PerWorkerMemo::new(|k: &u64| *k, 3, 4).is_err());
    }

    #[test]
    fn capacity_truncates_to_worker_multiple() {
        let cache = PerWorkerMemo::new(|k: &u64| *k, 10, 3).unwrap();
        assert_eq!(cache.capacity(), 9);
        assert_eq!(cache.workers(), 3);
    }

    #[test]
    fn same_key_is_computed_once_per_worker() {
        let calls = AtomicU32::new(0);
        let cache = PerWorkerMemo::new(
            |k: &u64| {
                calls.fetch_add(1, Ordering::SeqCst);
                *k
            },
            4,
            2,
        )
        .unwrap();

        cache.get(WorkerId::new(0), 5);
        cache.get(WorkerId::new(1), 5);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 0);

        // Repeat lookups now hit each worker's own store.
        cache.get(WorkerId::new(0), 5);
        cache.get(WorkerId::new(1), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.hits(), 2);
    }

    #[test]
    fn workers_evict_independently() {
        let cache = PerWorkerMemo::new(|k: &u64| *k, 4, 2).unwrap();
        let w0 = WorkerId::new(0);
        let w1 = WorkerId::new(1);

        // Worker 0 churns through its 2-entry store; worker 1 is untouched.
        for key in 0..6u64 {
            cache.get(w0, key);
        }
        cache.get(w1, 0);
        cache.get(w1, 0);

        let snap = cache.stats();
        assert_eq!(snap.misses, 7);
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.lookups(), 8);
    }

    #[test]
    fn parallel_workers_never_interfere() {
        let cache = Arc::new(PerWorkerMemo::new(|k: &u64| k * 7, 64, 4).unwrap());
        let threads: Vec<_> = (0..4usize)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let worker = WorkerId::new(t);
                    for i in 0..500u64 {
                        let key = i % 16;
                        assert_eq!(*cache.get(worker, key), key * 7);
                    }
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }

        let snap = cache.stats();
        assert_eq!(snap.lookups(), 2000);
        // Each worker's 16-entry working set fits its 16-entry store.
        assert_eq!(snap.misses, 64);
    }

    #[test]
    #[should_panic]
    fn out_of_range_worker_panics() {
        let cache = PerWorkerMemo::new(|k: &u64| *k, 4, 2).unwrap();
        cache.get(WorkerId::new(2), 1);
    }
}
