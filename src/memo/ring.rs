//! Ring-sharded memo with blocking per-shard locks.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::ds::{RingKey, RingRouter};
use crate::error::MemoError;
use crate::memo::{self, Shard};
use crate::stats::StatsSnapshot;
use crate::traits::{MemoCache, WorkerId};

/// Memoizing LRU cache sharded over a ring of stores.
///
/// Key `k` always lives in shard `(k / S) mod N`, where `S = C / N` is the
/// per-shard capacity: contiguous runs of S keys share a shard, and
/// successive runs advance around the ring. A dataset scanned in id order
/// therefore round-robins its lock acquisitions instead of pinning one
/// shard, deliberately anti-correlated with uniform-random access.
///
/// Lookups deduplicate across workers (unlike
/// [`PerWorkerMemo`](crate::memo::PerWorkerMemo)): whichever worker misses
/// first pays the producer, everyone else hits. The cost is blocking on the
/// owning shard's mutex when keys collide; if the workload hotspots onto
/// few shards, consider
/// [`OpportunisticMemo`](crate::memo::OpportunisticMemo).
///
/// # Example
///
/// ```
/// use memoring::memo::RingMemo;
/// use memoring::traits::{MemoCache, WorkerId};
///
/// // N = 2 shards of S = 2 entries: keys {0,1} own shard 0, {2,3} shard 1.
/// let cache = RingMemo::new(|k: &u64| k * 10, 4, 2).unwrap();
/// let w = WorkerId::new(0); // routing is by key, not worker
///
/// assert_eq!(*cache.get(w, 0), 0);
/// assert_eq!(*cache.get(w, 2), 20);
/// assert_eq!(*cache.get(w, 0), 0);  // hit on shard 0
/// assert_eq!(cache.hits(), 1);
/// ```
pub struct RingMemo<K, V, P> {
    shards: Vec<Shard<K, V>>,
    router: RingRouter,
    producer: P,
}

impl<K, V, P> RingMemo<K, V, P>
where
    K: RingKey + Eq + Hash,
    P: Fn(&K) -> V,
{
    /// Creates a ring of `workers` shards, each owning `capacity / workers`
    /// entries.
    ///
    /// Rejects zero capacity, zero workers, and `capacity < workers`.
    pub fn new(producer: P, capacity: usize, workers: usize) -> Result<Self, MemoError> {
        let per_shard = memo::validate_split(capacity, workers)?;
        Ok(Self {
            shards: (0..workers).map(|_| Shard::new(per_shard)).collect(),
            router: RingRouter::new(workers, per_shard as u64),
            producer,
        })
    }

    /// Number of shards on the ring.
    pub fn shards(&self) -> usize {
        self.shards.len()
    }

    /// The shard index owning `key`.
    pub fn shard_for(&self, key: K) -> usize {
        self.router.shard_for(key)
    }
}

impl<K, V, P> MemoCache<K, V> for RingMemo<K, V, P>
where
    K: RingKey + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn get(&self, _worker: WorkerId, key: K) -> Arc<V> {
        let shard = &self.shards[self.router.shard_for(key)];
        let mut store = shard.store.lock();
        memo::lookup(&mut store, &shard.stats, &self.producer, key)
    }

    fn stats(&self) -> StatsSnapshot {
        memo::aggregate_stats(&self.shards)
    }
}

impl<K, V, P> fmt::Debug for RingMemo<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingMemo")
            .field("shards", &self.shards.len())
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

impl<K, V, P> fmt::Display for RingMemo<K, V, P>
where
    K: RingKey + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&MemoCache::stats(self), f)
    }
}
