//! Coarse-locked single-store memo.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::MemoError;
use crate::memo;
use crate::stats::{StatsSnapshot, StoreStats};
use crate::store::LruStore;
use crate::traits::{MemoCache, WorkerId};

/// Memoizing LRU cache with one store and one mutex.
///
/// Every lookup (probe, producer call, insert) runs under the same lock,
/// so this variant is correct at any thread count and is the baseline the
/// sharded topologies are measured against. Contention grows linearly with
/// the worker count; switch to a ring topology when that bites.
///
/// The producer runs while the lock is held. A producer that calls back
/// into the same cache therefore deadlocks; that precondition is the
/// caller's to uphold, not defended against here.
///
/// # Example
///
/// ```
/// use memoring::memo::SingleMemo;
/// use memoring::traits::{MemoCache, WorkerId};
///
/// let cache = SingleMemo::new(|k: &u64| k * k, 64).unwrap();
/// let w = WorkerId::new(0); // ignored by this topology
///
/// assert_eq!(*cache.get(w, 9), 81);
/// assert_eq!(*cache.get(w, 9), 81);
/// assert_eq!(cache.hits(), 1);
/// ```
pub struct SingleMemo<K, V, P> {
    store: Mutex<LruStore<K, V>>,
    stats: StoreStats,
    producer: P,
    capacity: usize,
}

impl<K, V, P> SingleMemo<K, V, P>
where
    K: Copy + Eq + Hash,
    P: Fn(&K) -> V,
{
    /// Creates a cache memoizing `producer` under a budget of `capacity`
    /// entries. Rejects a zero capacity.
    pub fn new(producer: P, capacity: usize) -> Result<Self, MemoError> {
        if capacity == 0 {
            return Err(MemoError::config("cache capacity must be > 0"));
        }
        Ok(Self {
            store: Mutex::new(LruStore::new(capacity)),
            stats: StoreStats::new(),
            producer,
            capacity,
        })
    }
}

impl<K, V, P> MemoCache<K, V> for SingleMemo<K, V, P>
where
    K: Copy + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn get(&self, _worker: WorkerId, key: K) -> Arc<V> {
        let mut store = self.store.lock();
        memo::lookup(&mut store, &self.stats, &self.producer, key)
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.capacity)
    }
}

impl<K, V, P> fmt::Debug for SingleMemo<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleMemo")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V, P> fmt::Display for SingleMemo<K, V, P>
where
    K: Copy + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&MemoCache::stats(self), f)
    }
}
