use std::sync::Arc;
use std::thread;
use std::time::Duration;

use memoring::prelude::*;

/// Stand-in for loading and quantizing an image's descriptors.
fn compute_bow(image_id: &u64) -> SparseVector {
    thread::sleep(Duration::from_micros(200));
    (0..4)
        .map(|i| (((image_id * 31 + i) % 1024) as u32, 1.0 / (i + 1) as f32))
        .collect()
}

fn main() {
    let workers = 4;
    let cache: Arc<BowMemo<_>> = Arc::new(
        MemoBuilder::new(256)
            .workers(workers)
            .build(Topology::RingOpportunistic, compute_bow)
            .unwrap(),
    );

    // A query batch revisits images, so the second half of each worker's
    // scan is mostly hits.
    let handles: Vec<_> = (0..workers)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let worker = WorkerId::new(t);
                for round in 0..4u64 {
                    for image_id in 0..64u64 {
                        let bow = cache.get(worker, image_id + 16 * round);
                        assert_eq!(bow.len(), 4);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    println!("{cache}");
    println!(
        "computed {} bag-of-words vectors for {} lookups",
        cache.misses(),
        cache.lookups()
    );
}

// Expected output (times vary):
// Cache [ capacity: 256, hits: ..., misses: ..., hit rate: 0.7... ]
// computed ... bag-of-words vectors for 1024 lookups
//
// Explanation: each worker scans overlapping windows of image ids, so most
// revisits are served from the ring without recomputing.
