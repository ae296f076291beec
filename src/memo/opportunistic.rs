//! Ring-sharded memo with an opportunistic try-lock walk.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::ds::{RingKey, RingRouter};
use crate::error::MemoError;
use crate::memo::{self, Shard};
use crate::stats::StatsSnapshot;
use crate::traits::{MemoCache, WorkerId};

/// Ring-sharded memo that prefers any free shard over waiting for the
/// owner.
///
/// Routing is identical to [`RingMemo`](crate::memo::RingMemo), but the
/// lock discipline is opportunistic: starting at the owning shard, `get`
/// try-locks each shard around the ring and dispatches to the first one it
/// wins; only if every try-lock fails does it block on the owner.
///
/// The consequence is that a key may be memoized in any shard, not just its
/// owner: the ring degrades from a partitioned cache into a bag of caches.
/// Hit rate drops (a later lookup may probe a shard that never saw the
/// key's insert) in exchange for rarely waiting, which is the right trade
/// when keys hotspot onto few shards and tail latency matters more than
/// producer parsimony. Eviction stays per-shard LRU.
///
/// # Example
///
/// ```
/// use memoring::memo::OpportunisticMemo;
/// use memoring::traits::{MemoCache, WorkerId};
///
/// let cache = OpportunisticMemo::new(|k: &u64| k * 10, 4, 2).unwrap();
/// let w = WorkerId::new(0);
///
/// // Uncontended, behaves exactly like the blocking ring.
/// assert_eq!(*cache.get(w, 0), 0);
/// assert_eq!(*cache.get(w, 0), 0);
/// assert_eq!(cache.hits(), 1);
/// ```
pub struct OpportunisticMemo<K, V, P> {
    shards: Vec<Shard<K, V>>,
    router: RingRouter,
    producer: P,
}

impl<K, V, P> OpportunisticMemo<K, V, P>
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

    /// The shard index owning `key` (where an uncontended lookup lands).
    pub fn shard_for(&self, key: K) -> usize {
        self.router.shard_for(key)
    }
}

impl<K, V, P> MemoCache<K, V> for OpportunisticMemo<K, V, P>
where
    K: RingKey + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn get(&self, _worker: WorkerId, key: K) -> Arc<V> {
        // Walk the ring from the owner; the first shard whose lock is free
        // serves the lookup, owner or not.
        for offset in 0..self.shards.len() {
            let shard = &self.shards[self.router.shard_at_offset(key, offset)];
            if let Some(mut store) = shard.store.try_lock() {
                return memo::lookup(&mut store, &shard.stats, &self.producer, key);
            }
        }

        // Whole ring busy: wait for the owner like the blocking ring does.
        let shard = &self.shards[self.router.shard_for(key)];
        let mut store = shard.store.lock();
        memo::lookup(&mut store, &shard.stats, &self.producer, key)
    }

    fn stats(&self) -> StatsSnapshot {
        memo::aggregate_stats(&self.shards)
    }
}

impl<K, V, P> fmt::Debug for OpportunisticMemo<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpportunisticMemo")
            .field("shards", &self.shards.len())
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

impl<K, V, P> fmt::Display for OpportunisticMemo<K, V, P>
where
    K: RingKey + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&MemoCache::stats(self), f)
    }
}
