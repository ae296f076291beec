//! The cache topology family.
//!
//! Four interchangeable ways to memoize one expensive producer function,
//! trading locking overhead against hit rate:
//!
//! | Type                 | Stores | Locking                                  |
//! |----------------------|--------|------------------------------------------|
//! | [`SingleMemo`]       | 1      | one mutex around the whole lookup        |
//! | [`PerWorkerMemo`]    | N      | per-store, uncontended by construction   |
//! | [`RingMemo`]         | N      | per-shard, blocking acquire on the owner |
//! | [`OpportunisticMemo`]| N      | per-shard try-lock walk, owner fallback  |
//!
//! [`MemoCore`] is the unlocked single-store template the public variants
//! are assembled from; it doubles as the single-threaded correctness
//! baseline. All variants run the same lookup algorithm (`lookup`) against
//! an [`LruStore`]; they differ only in how a store is chosen and locked.

pub mod core;
pub mod opportunistic;
pub mod per_worker;
pub mod ring;
pub mod single;

pub use self::core::MemoCore;
pub use opportunistic::OpportunisticMemo;
pub use per_worker::PerWorkerMemo;
pub use ring::RingMemo;
pub use single::SingleMemo;

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::MemoError;
use crate::stats::{StatsSnapshot, StoreStats};
use crate::store::LruStore;

/// Validates a composite configuration and returns the per-store capacity
/// `C / N`.
///
/// Rejects zero capacity, zero workers, and `capacity < workers`; the last
/// would truncate to zero-capacity stores, which cannot hold anything.
pub(crate) fn validate_split(capacity: usize, workers: usize) -> Result<usize, MemoError> {
    if capacity == 0 {
        return Err(MemoError::config("cache capacity must be > 0"));
    }
    if workers == 0 {
        return Err(MemoError::config("worker count must be > 0"));
    }
    if capacity < workers {
        return Err(MemoError::config(format!(
            "capacity {capacity} splits to zero entries per store across {workers} workers"
        )));
    }
    Ok(capacity / workers)
}

/// One locked store plus its counters, as used by the composite topologies.
///
/// The counters sit outside the mutex so that statistics reads never take a
/// lock and never touch the store.
#[derive(Debug)]
pub(crate) struct Shard<K, V> {
    pub(crate) store: Mutex<LruStore<K, V>>,
    pub(crate) stats: StoreStats,
    capacity: usize,
}

impl<K, V> Shard<K, V>
where
    K: Copy + Eq + Hash,
{
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            store: Mutex::new(LruStore::new(capacity)),
            stats: StoreStats::new(),
            capacity,
        }
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot(self.capacity)
    }
}

/// Sums the statistics of a slice of shards into one snapshot.
///
/// Capacities add up, so a composite reports its truncated aggregate budget
/// `N * (C / N)`.
pub(crate) fn aggregate_stats<K, V>(shards: &[Shard<K, V>]) -> StatsSnapshot
where
    K: Copy + Eq + Hash,
{
    let mut total = StatsSnapshot::default();
    for shard in shards {
        total.merge(&shard.snapshot());
    }
    total
}

/// The lookup algorithm every topology runs once it holds a store.
///
/// Hit: refresh recency, count the hit, hand out a clone of the stored
/// handle. Miss: invoke the producer, then count the miss and insert at the
/// MRU position (evicting if full). The miss counter is only incremented
/// after the producer returns, so a panicking producer unwinds out of the
/// cache with no counter touched and no entry inserted.
pub(crate) fn lookup<K, V, P>(
    store: &mut LruStore<K, V>,
    stats: &StoreStats,
    producer: &P,
    key: K,
) -> Arc<V>
where
    K: Copy + Eq + Hash,
    P: Fn(&K) -> V,
{
    let _timer = stats.lookup_timer();
    if let Some(value) = store.touch_get(&key) {
        stats.record_hit();
        return value;
    }
    let value = Arc::new(producer(&key));
    stats.record_miss();
    store.insert(key, Arc::clone(&value));
    value
}
