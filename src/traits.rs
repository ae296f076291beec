//! The shared cache contract.
//!
//! Every thread-safe cache topology implements [`MemoCache`], so call sites
//! pick a topology at construction and touch one interface afterwards:
//!
//! ```text
//!                    ┌──────────────────────────────────────────┐
//!                    │            MemoCache<K, V>               │
//!                    │                                          │
//!                    │  get(&self, WorkerId, K) -> Arc<V>       │
//!                    │  get_many(&self, WorkerId, &[K])         │
//!                    │  stats() / hits() / misses() / lookups() │
//!                    │  capacity() / total_lookup_time()        │
//!                    └─────────────────┬────────────────────────┘
//!                                      │
//!          ┌──────────────┬────────────┼───────────────┬─────────────────┐
//!          ▼              ▼            ▼               ▼                 ▼
//!    SingleMemo    PerWorkerMemo    RingMemo    OpportunisticMemo    Memo (enum)
//! ```
//!
//! Two contract points worth calling out:
//!
//! - **Worker identity is a call parameter.** The surrounding worker pool
//!   owns the mapping from thread to [`WorkerId`]; the cache never probes
//!   the OS or thread-local state, which keeps every topology testable from
//!   a single thread. Topologies that don't need the id ignore it.
//! - **Exactly-one-counter.** Every `get` bumps exactly one of hits/misses
//!   on the cache as a whole; `lookups == hits + misses` at any observation
//!   point. Statistics reads are lock-free, side-effect-free, and never
//!   touch a store.

use std::sync::Arc;
use std::time::Duration;

use crate::stats::StatsSnapshot;

/// Identity of a worker in the surrounding bounded pool: a small integer in
/// `[0, workers)`.
///
/// Supplied on every lookup rather than discovered globally. The contract
/// is stability: the same thread keeps the same id for the lifetime of the
/// cache, and no two live threads share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(usize);

impl WorkerId {
    /// Wraps a pool index as a worker identity.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the pool index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for WorkerId {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

/// Memoizing cache over a producer function `P: K -> V`.
///
/// `get` never fails: the producer is assumed total, and a producer panic
/// unwinds through the cache untouched: no counter is updated and nothing
/// is inserted, so a retry is fully visible to the caller.
pub trait MemoCache<K: Copy, V> {
    /// Returns the memoized value for `key`, invoking the producer on a
    /// miss.
    ///
    /// Blocks only as required by the topology's locking discipline.
    fn get(&self, worker: WorkerId, key: K) -> Arc<V>;

    /// Returns memoized values for `keys`, preserving input order and
    /// multiplicity. Semantically identical to repeated [`get`](Self::get).
    fn get_many(&self, worker: WorkerId, keys: &[K]) -> Vec<Arc<V>> {
        keys.iter().map(|&key| self.get(worker, key)).collect()
    }

    /// Current counters, aggregated over all constituent stores.
    fn stats(&self) -> StatsSnapshot;

    /// Lookups answered from a store.
    fn hits(&self) -> u64 {
        self.stats().hits
    }

    /// Lookups that invoked the producer.
    fn misses(&self) -> u64 {
        self.stats().misses
    }

    /// Total lookups; always `hits + misses`.
    fn lookups(&self) -> u64 {
        self.stats().lookups()
    }

    /// Entry budget. Composites report their truncated aggregate
    /// `N * (C / N)`.
    fn capacity(&self) -> usize {
        self.stats().capacity
    }

    /// Total wall-clock time spent inside `get` across all stores,
    /// producer time included.
    fn total_lookup_time(&self) -> Duration {
        self.stats().lookup_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_id_round_trips_its_index() {
        let id = WorkerId::new(3);
        assert_eq!(id.index(), 3);
        assert_eq!(WorkerId::from(3), id);
    }

    #[test]
    fn defaulted_accessors_derive_from_stats() {
        struct Fixed;
        impl MemoCache<u64, u64> for Fixed {
            fn get(&self, _worker: WorkerId, _key: u64) -> Arc<u64> {
                Arc::new(0)
            }
            fn stats(&self) -> StatsSnapshot {
                StatsSnapshot {
                    hits: 7,
                    misses: 3,
                    capacity: 32,
                    lookup_time: Duration::from_nanos(9),
                }
            }
        }

        let cache = Fixed;
        assert_eq!(cache.hits(), 7);
        assert_eq!(cache.misses(), 3);
        assert_eq!(cache.lookups(), 10);
        assert_eq!(cache.capacity(), 32);
        assert_eq!(cache.total_lookup_time(), Duration::from_nanos(9));
    }

    #[test]
    fn get_many_maps_over_get() {
        struct Echo;
        impl MemoCache<u64, u64> for Echo {
            fn get(&self, _worker: WorkerId, key: u64) -> Arc<u64> {
                Arc::new(key)
            }
            fn stats(&self) -> StatsSnapshot {
                StatsSnapshot::default()
            }
        }

        let values = Echo.get_many(WorkerId::new(0), &[5, 5, 2]);
        let values: Vec<u64> = values.iter().map(|v| **v).collect();
        assert_eq!(values, vec![5, 5, 2]);
    }
}
