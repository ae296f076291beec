//! Single LRU store: the building block every cache topology shards over.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                       LruStore<K, V>                         │
//!   │                                                              │
//!   │   ┌──────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, NodeId>  (key -> recency node)         │   │
//!   │   └───────────────┬──────────────────────────────────────┘   │
//!   │                   │                                          │
//!   │                   ▼                                          │
//!   │   ┌──────────────────────────────────────────────────────┐   │
//!   │   │  RecencyList<(K, Arc<V>)>                            │   │
//!   │   │                                                      │   │
//!   │   │  front ─► [oldest] ◄──► ... ◄──► [newest] ◄── back   │   │
//!   │   │           (evict)                (touch lands here)  │   │
//!   │   └──────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! | Component              | Description                                  |
//! |------------------------|----------------------------------------------|
//! | `FxHashMap<K, NodeId>` | O(1) key lookup into the recency list        |
//! | `RecencyList`          | Index-linked eviction order, tail = MRU      |
//! | `Arc<V>`               | Values handed out as shared handles          |
//!
//! All operations are O(1). Entries are `(K, Arc<V>)` pairs; the key is
//! duplicated into the list node so that evicting the front yields the key
//! to remove from the index without a reverse lookup.
//!
//! ## Thread Safety
//!
//! `LruStore` is **not** thread-safe; every method takes `&mut self`. The
//! cache topologies in [`crate::memo`] decide how stores are locked: one
//! coarse mutex, one uncontended mutex per worker, or one mutex per ring
//! shard. The store itself never blocks.

use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ds::{NodeId, RecencyList};
use crate::error::MemoError;

/// Size-bounded LRU map from `K` to `Arc<V>`.
///
/// Lookup, insert, and eviction are O(1); eviction always removes the entry
/// whose most recent touch is oldest.
#[derive(Debug)]
pub struct LruStore<K, V> {
    index: FxHashMap<K, NodeId>,
    order: RecencyList<(K, Arc<V>)>,
    capacity: usize,
}

impl<K, V> LruStore<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Creates a store holding at most `capacity` entries.
    ///
    /// Capacity validation happens in the cache constructors; the store
    /// itself assumes a positive budget.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "store capacity must be positive");
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            order: RecencyList::with_capacity(capacity),
            capacity,
        }
    }

    /// Looks up `key`, refreshing its recency on a hit.
    ///
    /// Returns a shared handle to the stored value, or `None` if the key is
    /// not resident.
    pub fn touch_get(&mut self, key: &K) -> Option<Arc<V>> {
        let id = *self.index.get(key)?;
        self.order.move_to_back(id);
        let (_, value) = self.order.get(id)?;
        Some(Arc::clone(value))
    }

    /// Inserts `key -> value` at the MRU position, evicting the LRU entry
    /// if the store is full.
    ///
    /// An existing entry for `key` is dropped and replaced rather than
    /// mutated in place.
    pub fn insert(&mut self, key: K, value: Arc<V>) {
        if let Some(old_id) = self.index.remove(&key) {
            self.order.remove(old_id);
        } else if self.order.len() == self.capacity {
            self.evict_front();
        }
        let id = self.order.push_back((key, value));
        self.index.insert(key, id);

        #[cfg(debug_assertions)]
        self.debug_validate();
    }

    /// Returns `true` if `key` is resident, without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the key next in line for eviction, if any.
    pub fn peek_lru(&self) -> Option<&K> {
        self.order.front().map(|(key, _)| key)
    }

    /// Returns the current number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the entry budget.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops the entry at the front of the recency list.
    fn evict_front(&mut self) {
        if let Some((key, _)) = self.order.pop_front() {
            self.index.remove(&key);
        }
    }

    /// Verifies that the index and the recency list agree.
    ///
    /// A failure here is an implementation bug; callers cannot recover.
    pub fn check_invariants(&self) -> Result<(), MemoError> {
        if self.index.len() != self.order.len() {
            return Err(MemoError::invariant(format!(
                "index holds {} keys but recency list holds {} entries",
                self.index.len(),
                self.order.len()
            )));
        }
        if self.order.len() > self.capacity {
            return Err(MemoError::invariant(format!(
                "{} entries resident, capacity is {}",
                self.order.len(),
                self.capacity
            )));
        }
        for (key, _) in self.order.iter() {
            if !self.index.contains_key(key) {
                return Err(MemoError::invariant(
                    "recency list entry missing from index",
                ));
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    fn debug_validate(&self) {
        self.order.debug_validate_invariants();
        debug_assert!(self.check_invariants().is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(capacity: usize) -> LruStore<u64, u64> {
        LruStore::new(capacity)
    }

    #[test]
    fn insert_and_touch_get_round_trip() {
        let mut s = store(4);
        s.insert(1, Arc::new(10));
        let v = s.touch_get(&1).unwrap();
        assert_eq!(*v, 10);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        let mut s = store(4);
        s.insert(1, Arc::new(10));
        assert!(s.touch_get(&2).is_none());
    }

    #[test]
    fn full_store_evicts_oldest_insert() {
        let mut s = store(2);
        s.insert(1, Arc::new(1));
        s.insert(2, Arc::new(2));
        s.insert(3, Arc::new(3));

        assert_eq!(s.len(), 2);
        assert!(!s.contains(&1));
        assert!(s.contains(&2));
        assert!(s.contains(&3));
    }

    #[test]
    fn touch_refreshes_eviction_order() {
        let mut s = store(3);
        s.insert(1, Arc::new(1));
        s.insert(2, Arc::new(2));
        s.insert(3, Arc::new(3));

        // Touch 1 so that 2 becomes the eviction victim.
        s.touch_get(&1);
        assert_eq!(s.peek_lru(), Some(&2));

        s.insert(4, Arc::new(4));
        assert!(s.contains(&1));
        assert!(!s.contains(&2));
        assert!(s.contains(&3));
        assert!(s.contains(&4));
    }

    #[test]
    fn reinsert_replaces_without_growing() {
        let mut s = store(2);
        s.insert(1, Arc::new(1));
        s.insert(2, Arc::new(2));
        s.insert(1, Arc::new(100));

        assert_eq!(s.len(), 2);
        assert_eq!(*s.touch_get(&1).unwrap(), 100);
        // The replaced entry is now MRU; 2 is the victim.
        assert_eq!(s.peek_lru(), Some(&2));
    }

    #[test]
    fn capacity_one_alternates_naturally() {
        let mut s = store(1);
        s.insert(1, Arc::new(1));
        assert!(s.contains(&1));
        s.insert(2, Arc::new(2));
        assert!(!s.contains(&1));
        assert!(s.contains(&2));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn len_never_exceeds_capacity() {
        let mut s = store(3);
        for key in 0..100u64 {
            s.insert(key, Arc::new(key));
            assert!(s.len() <= s.capacity());
        }
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn handles_outlive_eviction() {
        let mut s = store(1);
        s.insert(1, Arc::new(11));
        let handle = s.touch_get(&1).unwrap();
        s.insert(2, Arc::new(22));
        // Entry 1 is gone from the store but the caller's handle is intact.
        assert!(!s.contains(&1));
        assert_eq!(*handle, 11);
    }

    #[test]
    fn invariants_hold_through_churn() {
        let mut s = store(4);
        for key in 0..64u64 {
            s.insert(key % 7, Arc::new(key));
            if key % 3 == 0 {
                s.touch_get(&(key % 5));
            }
            s.check_invariants().unwrap();
        }
    }
}
