use std::sync::Arc;
use std::thread;

use memoring::prelude::*;

fn main() {
    let workers = 4;
    let topologies = [
        Topology::Single,
        Topology::PerWorker,
        Topology::RingShared,
        Topology::RingOpportunistic,
    ];

    for topology in topologies {
        let cache = Arc::new(
            MemoBuilder::new(128)
                .workers(workers)
                .build(topology, |k: &u64| k * k)
                .unwrap(),
        );

        let handles: Vec<_> = (0..workers)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let worker = WorkerId::new(t);
                    for _ in 0..8 {
                        for key in 0..64u64 {
                            assert_eq!(*cache.get(worker, key), key * key);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        println!("{topology:?}: {cache}");
    }
}

// Expected output (hit rates vary by topology):
// Single: Cache [ capacity: 128, hits: 1984, misses: 64, hit rate: 0.96875 ]
// PerWorker: Cache [ capacity: 128, hits: 1792, misses: 256, hit rate: 0.875 ]
// RingShared: Cache [ capacity: 128, hits: 1984, misses: 64, hit rate: 0.96875 ]
// RingOpportunistic: Cache [ capacity: 128, hits: ..., misses: ..., hit rate: ... ]
//
// Explanation: the per-worker topology recomputes every key once per
// worker; the rings deduplicate but the opportunistic ring may recompute a
// key that spilled to a non-owner shard under contention.
