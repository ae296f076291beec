//! Unified construction for all cache topologies.
//!
//! Provides a single entry point that hides which concrete topology backs a
//! cache, while keeping dispatch static: [`Memo`] is a tagged enum over the
//! four variants, selected once at construction and dispatched with a
//! `match` rather than a virtual call on every lookup.
//!
//! ## Example
//!
//! ```
//! use memoring::builder::{MemoBuilder, Topology};
//! use memoring::traits::{MemoCache, WorkerId};
//!
//! let cache = MemoBuilder::new(256)
//!     .workers(4)
//!     .build(Topology::RingShared, |k: &u64| k * k)
//!     .unwrap();
//!
//! assert_eq!(*cache.get(WorkerId::new(0), 12), 144);
//! println!("{cache}"); // Cache [ capacity: 256, hits: 0, misses: 1, ... ]
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::ds::RingKey;
use crate::error::MemoError;
use crate::memo::{OpportunisticMemo, PerWorkerMemo, RingMemo, SingleMemo};
use crate::stats::StatsSnapshot;
use crate::traits::{MemoCache, WorkerId};

/// Available cache topologies.
///
/// All four implement the same contract; they differ in how stores are
/// partitioned and locked. See the [`memo`](crate::memo) module table for
/// the trade-offs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// One store, one mutex around every lookup.
    Single,
    /// One private store per worker; no sharing, no contention.
    PerWorker,
    /// Ring of shards routed by key range; blocking owner lock.
    RingShared,
    /// Ring of shards with a try-lock walk; blocking owner fallback.
    RingOpportunistic,
}

/// Builder carrying the capacity and worker-pool size shared by every
/// topology.
#[derive(Debug, Clone, Copy)]
pub struct MemoBuilder {
    capacity: usize,
    workers: usize,
}

impl MemoBuilder {
    /// Starts a builder for a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            workers: 1,
        }
    }

    /// Sets the worker-pool size the cache will serve. Composite topologies
    /// split the capacity into `workers` stores of `capacity / workers`
    /// entries; `Single` ignores this.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Builds a cache of the chosen topology over `producer`.
    ///
    /// Fails with [`MemoError`] on zero capacity, zero workers, or a
    /// capacity too small to give every store at least one entry.
    pub fn build<K, V, P>(self, topology: Topology, producer: P) -> Result<Memo<K, V, P>, MemoError>
    where
        K: RingKey + Eq + Hash,
        P: Fn(&K) -> V,
    {
        let inner = match topology {
            Topology::Single => MemoInner::Single(SingleMemo::new(producer, self.capacity)?),
            Topology::PerWorker => {
                MemoInner::PerWorker(PerWorkerMemo::new(producer, self.capacity, self.workers)?)
            }
            Topology::RingShared => {
                MemoInner::Ring(RingMemo::new(producer, self.capacity, self.workers)?)
            }
            Topology::RingOpportunistic => MemoInner::Opportunistic(OpportunisticMemo::new(
                producer,
                self.capacity,
                self.workers,
            )?),
        };
        Ok(Memo { inner })
    }
}

/// A memo cache of any topology behind one concrete type.
///
/// Built by [`MemoBuilder::build`]; every operation dispatches with a
/// `match`, so the hot path stays free of virtual calls.
pub struct Memo<K, V, P> {
    inner: MemoInner<K, V, P>,
}

enum MemoInner<K, V, P> {
    Single(SingleMemo<K, V, P>),
    PerWorker(PerWorkerMemo<K, V, P>),
    Ring(RingMemo<K, V, P>),
    Opportunistic(OpportunisticMemo<K, V, P>),
}

impl<K, V, P> Memo<K, V, P> {
    /// The topology selected at construction.
    pub fn topology(&self) -> Topology {
        match &self.inner {
            MemoInner::Single(_) => Topology::Single,
            MemoInner::PerWorker(_) => Topology::PerWorker,
            MemoInner::Ring(_) => Topology::RingShared,
            MemoInner::Opportunistic(_) => Topology::RingOpportunistic,
        }
    }
}

impl<K, V, P> MemoCache<K, V> for Memo<K, V, P>
where
    K: RingKey + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn get(&self, worker: WorkerId, key: K) -> Arc<V> {
        match &self.inner {
            MemoInner::Single(cache) => cache.get(worker, key),
            MemoInner::PerWorker(cache) => cache.get(worker, key),
            MemoInner::Ring(cache) => cache.get(worker, key),
            MemoInner::Opportunistic(cache) => cache.get(worker, key),
        }
    }

    fn stats(&self) -> StatsSnapshot {
        match &self.inner {
            MemoInner::Single(cache) => MemoCache::stats(cache),
            MemoInner::PerWorker(cache) => MemoCache::stats(cache),
            MemoInner::Ring(cache) => MemoCache::stats(cache),
            MemoInner::Opportunistic(cache) => MemoCache::stats(cache),
        }
    }
}

impl<K, V, P> fmt::Debug for Memo<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("topology", &self.topology())
            .finish_non_exhaustive()
    }
}

impl<K, V, P> fmt::Display for Memo<K, V, P>
where
    K: RingKey + Eq + Hash,
    P: Fn(&K) -> V,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&MemoCache::stats(self), f)
    }
}

// ---------------------------------------------------------------------------
// Pipeline instantiations
// ---------------------------------------------------------------------------

/// Sparse bag-of-words vector: (visual word, tf-idf weight) pairs, sorted
/// by word id.
pub type SparseVector = Vec<(u32, f32)>;

/// Memo cache for image id → bag-of-words vectors.
pub type BowMemo<P> = Memo<u64, SparseVector, P>;

/// Memo cache for image id → dense descriptor vectors.
pub type DescriptorMemo<P> = Memo<u64, Vec<f32>, P>;
